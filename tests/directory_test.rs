use chrono::{NaiveDate, Utc};
use parishbook::celebrations::Window;
use parishbook::directory::{directory_page, DirectoryQuery};
use parishbook::model::{Family, Person, Role};
use parishbook::requests::{
    build_request, submit_request, within_window, RequestError, RequestInput, RequestType,
};
use parishbook::store::{demo_families, MemoryDirectoryStore, RequestStore};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn query(text: &str) -> DirectoryQuery {
    DirectoryQuery { text: text.to_string(), subgroup: None, page: 1, page_size: 10 }
}

fn request_input(praying_for: &str, service_date: NaiveDate) -> RequestInput {
    RequestInput {
        member_id: "1".to_string(),
        member_name: "John Doe".to_string(),
        member_avatar_url: "https://placehold.co/128x128.png".to_string(),
        praying_for: praying_for.to_string(),
        request_type: RequestType::OrmaQurbana,
        other_request: None,
        request_date: service_date,
    }
}

#[test]
fn test_search_is_case_insensitive_substring_over_names_and_emails() {
    let families = demo_families();

    // "john" hits John Doe by name and Mary Johnson by family name.
    let page = directory_page(&families, false, &query("john"));
    let names: Vec<&str> =
        page.entries.iter().map(|entry| entry.family.head.name.as_str()).collect();
    assert_eq!(names, vec!["John Doe", "Mary Johnson"]);

    let by_email = directory_page(&families, false, &query("D.WILLIAMS@EXAMPLE.COM"));
    assert_eq!(by_email.total_matches, 1);
    assert_eq!(by_email.entries[0].family.head.name, "David Williams");

    let by_family_name = directory_page(&families, false, &query("smith family"));
    assert_eq!(by_family_name.total_matches, 1);
}

#[test]
fn test_empty_query_lists_everyone_visible() {
    let families = demo_families();
    let page = directory_page(&families, false, &query(""));
    // Seven seeded records minus the sign-in account and one inactive family.
    assert_eq!(page.total_matches, 5);
}

#[test]
fn test_sign_in_account_is_never_listed() {
    let families = demo_families();
    for viewer_is_admin in [false, true] {
        let page = directory_page(&families, viewer_is_admin, &query(""));
        assert!(page.entries.iter().all(|entry| entry.family.id != "admin"));
    }
}

#[test]
fn test_members_holding_the_admin_role_are_listed() {
    // The Admin role grants privileges; it does not hide the family.
    let mut families = demo_families();
    let mut secretary = Family::new("7", Person::new("Parish Secretary"));
    secretary.role = Role::Admin;
    families.push(secretary);

    for viewer_is_admin in [false, true] {
        let page = directory_page(&families, viewer_is_admin, &query("parish secretary"));
        assert_eq!(page.total_matches, 1);
        assert_eq!(page.entries[0].family.head.name, "Parish Secretary");
    }
}

#[test]
fn test_inactive_records_are_shown_to_admins_only() {
    let families = demo_families();

    let member_view = directory_page(&families, false, &query("jones"));
    assert_eq!(member_view.total_matches, 0);

    let admin_view = directory_page(&families, true, &query("jones"));
    assert_eq!(admin_view.total_matches, 1);
    assert_eq!(admin_view.entries[0].family.head.name, "Peter Jones");
}

#[test]
fn test_pagination_slices_and_counts() {
    let families: Vec<Family> = (0..25)
        .map(|index| {
            let mut family =
                Family::new(format!("{index}"), Person::new(format!("Member {index:02}")));
            family.family_name = Some(format!("Family {index:02}"));
            family
        })
        .collect();

    let first = directory_page(
        &families,
        false,
        &DirectoryQuery { page: 1, page_size: 10, ..Default::default() },
    );
    assert_eq!(first.entries.len(), 10);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.total_matches, 25);
    assert_eq!(first.entries[0].family.head.name, "Member 00");

    let last = directory_page(
        &families,
        false,
        &DirectoryQuery { page: 3, page_size: 10, ..Default::default() },
    );
    assert_eq!(last.entries.len(), 5);
    assert_eq!(last.entries[0].family.head.name, "Member 20");

    let beyond = directory_page(
        &families,
        false,
        &DirectoryQuery { page: 4, page_size: 10, ..Default::default() },
    );
    assert!(beyond.entries.is_empty());
    assert_eq!(beyond.total_matches, 25);
}

#[test]
fn test_page_zero_is_treated_as_first_page() {
    let families = demo_families();
    let page = directory_page(&families, false, &DirectoryQuery::default());
    assert_eq!(page.page, 1);
    assert!(!page.entries.is_empty());
}

#[test]
fn test_subgroup_selection_highlights_embedded_members() {
    let families = demo_families();
    let page = directory_page(
        &families,
        false,
        &DirectoryQuery { subgroup: Some("Sunday School".to_string()), ..Default::default() },
    );

    let doe = page.entries.iter().find(|entry| entry.family.id == "1").unwrap();
    let highlighted: Vec<&str> =
        doe.matching_members.iter().map(|member| member.name.as_str()).collect();
    assert_eq!(highlighted, vec!["Jimmy Doe", "Jenny Doe"]);

    // Mary Johnson belongs to Sunday School herself, but highlighting only
    // covers embedded members.
    let johnson = page.entries.iter().find(|entry| entry.family.id == "4").unwrap();
    assert!(johnson.matching_members.is_empty());
}

#[test]
fn test_no_subgroup_means_no_highlighting() {
    let families = demo_families();
    let page = directory_page(&families, false, &query(""));
    assert!(page.entries.iter().all(|entry| entry.matching_members.is_empty()));
}

#[tokio::test]
async fn test_requests_list_in_service_date_order() {
    let store = MemoryDirectoryStore::new();
    submit_request(&store, request_input("Grandmother Rose", date(2024, 7, 14))).await.unwrap();
    submit_request(&store, request_input("Uncle Thomas", date(2024, 6, 2))).await.unwrap();
    submit_request(&store, request_input("The Martin family", date(2024, 6, 30))).await.unwrap();

    let listed = store.list_requests().await.unwrap();
    let subjects: Vec<&str> =
        listed.iter().map(|request| request.praying_for.as_str()).collect();
    assert_eq!(subjects, vec!["Uncle Thomas", "The Martin family", "Grandmother Rose"]);
}

#[tokio::test]
async fn test_submitted_requests_carry_ids_and_timestamps() {
    let store = MemoryDirectoryStore::new();
    let stored =
        submit_request(&store, request_input("Grandmother Rose", date(2024, 7, 14))).await.unwrap();
    assert!(!stored.id.is_empty());
    assert_eq!(stored.request_type, RequestType::OrmaQurbana);
}

#[test]
fn test_blank_subject_is_rejected() {
    let result = build_request(request_input("   ", date(2024, 7, 14)), Utc::now());
    assert!(matches!(result, Err(RequestError::MissingSubject)));
}

#[test]
fn test_other_requests_need_enough_detail() {
    let mut input = request_input("Grandmother Rose", date(2024, 7, 14));
    input.request_type = RequestType::Other;

    input.other_request = None;
    assert!(matches!(
        build_request(input.clone(), Utc::now()),
        Err(RequestError::MissingDetail)
    ));

    input.other_request = Some("too short".to_string());
    assert!(matches!(
        build_request(input.clone(), Utc::now()),
        Err(RequestError::MissingDetail)
    ));

    input.other_request = Some("Prayers for her recovery after surgery".to_string());
    let built = build_request(input, Utc::now()).unwrap();
    assert_eq!(
        built.other_request.as_deref(),
        Some("Prayers for her recovery after surgery")
    );
}

#[test]
fn test_detail_length_only_binds_other_requests() {
    let mut input = request_input("Grandmother Rose", date(2024, 7, 14));
    input.other_request = Some("hi".to_string());
    assert!(build_request(input, Utc::now()).is_ok());
}

#[test]
fn test_requests_filter_by_service_window() {
    let requests = vec![
        build_request(request_input("May", date(2024, 5, 30)), Utc::now()).unwrap(),
        build_request(request_input("June", date(2024, 6, 10)), Utc::now()).unwrap(),
        build_request(request_input("July", date(2024, 7, 2)), Utc::now()).unwrap(),
    ];
    let window = Window::new(date(2024, 6, 1), date(2024, 6, 30)).unwrap();

    let inside = within_window(&requests, window);
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].praying_for, "June");
}

#[test]
fn test_request_types_use_document_labels() {
    let encoded = serde_json::to_string(&RequestType::Other).unwrap();
    assert_eq!(encoded, "\"Other Intercessory Prayers\"");
    let decoded: RequestType = serde_json::from_str("\"Orma Qurbana\"").unwrap();
    assert_eq!(decoded, RequestType::OrmaQurbana);
}
