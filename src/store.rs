//! Record-store contracts and the in-memory implementation.
//
// The directory can sit on any document store; the traits below are the
// seam. `MemoryDirectoryStore` backs tests and demo deployments and keeps
// the same observable behavior: reads hand out sanitized records and a
// write batch applies all-or-nothing.

use crate::model::{Family, MaritalStatus, MemberStatus, Person, Relation, Role};
use crate::requests::{sort_by_service_date, SpecialRequest};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::{debug, info};
use secrecy::SecretString;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("record not found: {0}")]
    NotFound(String),
}

/// Server-side narrowing applied when listing families.
///
/// `zone` and `ward` match the record exactly; `subgroup` matches when the
/// head or any embedded member belongs to the named organization.
#[derive(Debug, Clone, Default)]
pub struct DirectoryFilter {
    pub zone: Option<String>,
    pub ward: Option<String>,
    pub subgroup: Option<String>,
}

impl DirectoryFilter {
    pub fn matches(&self, family: &Family) -> bool {
        if let Some(zone) = &self.zone {
            if family.zone.as_deref() != Some(zone.as_str()) {
                return false;
            }
        }
        if let Some(ward) = &self.ward {
            if family.ward.as_deref() != Some(ward.as_str()) {
                return false;
            }
        }
        if let Some(subgroup) = &self.subgroup {
            let in_head = family.head.sub_groups.iter().any(|group| group == subgroup);
            let in_members = family
                .family
                .iter()
                .any(|member| member.sub_groups.iter().any(|group| group == subgroup));
            if !in_head && !in_members {
                return false;
            }
        }
        true
    }
}

/// One write in an atomic batch.
///
/// `Create` ignores any id on the record and lets the store assign one;
/// `Replace` overwrites the record stored under `id` wholesale.
#[derive(Debug, Clone)]
pub enum FamilyWrite {
    Create(Family),
    Replace { id: String, family: Family },
}

#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn fetch_all_families(&self, filter: &DirectoryFilter) -> Result<Vec<Family>, StoreError>;

    async fn fetch_family(&self, id: &str) -> Result<Option<Family>, StoreError>;

    /// Look a family up by its register number, the natural key used by
    /// roster import.
    async fn fetch_family_by_natural_key(
        &self,
        family_id: &str,
    ) -> Result<Option<Family>, StoreError>;

    /// Apply every write or none of them.
    async fn commit_batch(&self, writes: Vec<FamilyWrite>) -> Result<(), StoreError>;

    async fn is_administrator(&self, principal_id: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn insert_request(&self, request: SpecialRequest) -> Result<(), StoreError>;

    /// All requests ordered by service date ascending.
    async fn list_requests(&self) -> Result<Vec<SpecialRequest>, StoreError>;
}

/// In-memory store used by tests and demo deployments.
pub struct MemoryDirectoryStore {
    families: RwLock<Vec<Family>>,
    requests: RwLock<Vec<SpecialRequest>>,
}

impl MemoryDirectoryStore {
    pub fn new() -> Self {
        Self { families: RwLock::new(Vec::new()), requests: RwLock::new(Vec::new()) }
    }

    pub fn with_families(families: Vec<Family>) -> Self {
        Self { families: RwLock::new(families), requests: RwLock::new(Vec::new()) }
    }

    /// Store pre-loaded with the demo congregation.
    pub fn with_demo_data() -> Self {
        Self::with_families(demo_families())
    }
}

impl Default for MemoryDirectoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectoryStore for MemoryDirectoryStore {
    async fn fetch_all_families(&self, filter: &DirectoryFilter) -> Result<Vec<Family>, StoreError> {
        let families = self.families.read().await;
        let listed: Vec<Family> =
            families.iter().filter(|family| filter.matches(family)).map(Family::sanitized).collect();
        debug!("Listed {} of {} family records", listed.len(), families.len());
        Ok(listed)
    }

    async fn fetch_family(&self, id: &str) -> Result<Option<Family>, StoreError> {
        let families = self.families.read().await;
        Ok(families.iter().find(|family| family.id == id).map(Family::sanitized))
    }

    async fn fetch_family_by_natural_key(
        &self,
        family_id: &str,
    ) -> Result<Option<Family>, StoreError> {
        let families = self.families.read().await;
        Ok(families
            .iter()
            .find(|family| family.family_id.as_deref() == Some(family_id))
            .map(Family::sanitized))
    }

    async fn commit_batch(&self, writes: Vec<FamilyWrite>) -> Result<(), StoreError> {
        let mut families = self.families.write().await;

        // Validate before touching anything so a failed batch leaves the
        // store exactly as it was.
        for write in &writes {
            if let FamilyWrite::Replace { id, .. } = write {
                if !families.iter().any(|family| family.id == *id) {
                    return Err(StoreError::NotFound(format!("family {id} does not exist")));
                }
            }
        }

        let count = writes.len();
        for write in writes {
            match write {
                FamilyWrite::Create(mut family) => {
                    family.id = Uuid::new_v4().to_string();
                    families.push(family);
                }
                FamilyWrite::Replace { id, mut family } => {
                    family.id = id.clone();
                    if let Some(slot) = families.iter_mut().find(|existing| existing.id == id) {
                        *slot = family;
                    }
                }
            }
        }
        info!("Committed batch of {} family writes", count);
        Ok(())
    }

    async fn is_administrator(&self, principal_id: &str) -> Result<bool, StoreError> {
        let families = self.families.read().await;
        Ok(families.iter().any(|family| family.id == principal_id && family.role == Role::Admin))
    }
}

#[async_trait]
impl RequestStore for MemoryDirectoryStore {
    async fn insert_request(&self, request: SpecialRequest) -> Result<(), StoreError> {
        let mut requests = self.requests.write().await;
        requests.push(request);
        Ok(())
    }

    async fn list_requests(&self) -> Result<Vec<SpecialRequest>, StoreError> {
        let requests = self.requests.read().await;
        let mut listed = requests.clone();
        sort_by_service_date(&mut listed);
        Ok(listed)
    }
}

/// Demo congregation: one sign-in account plus a handful of families
/// spread across zones, wards and organizations.
pub fn demo_families() -> Vec<Family> {
    let mut admin_head = Person::new("Admin User");
    admin_head.email = Some("admin@example.com".to_string());
    admin_head.phone = Some("admin".to_string());
    admin_head.address = Some("N/A".to_string());
    admin_head.avatar_url = Some("https://placehold.co/128x128.png".to_string());
    let mut admin = Family::new("admin", admin_head);
    admin.family_name = Some("Admin".to_string());
    admin.role = Role::Admin;
    admin.password = Some(SecretString::from("adminpassword".to_string()));

    let mut doe_head = Person::new("John Doe");
    doe_head.email = Some("john.doe@example.com".to_string());
    doe_head.phone = Some("555-0101".to_string());
    doe_head.address = Some("123 Maple St, Anytown".to_string());
    doe_head.birthday = demo_date(1985, 5, 20);
    doe_head.marital_status = MaritalStatus::Married;
    doe_head.wedding_day = demo_date(2010, 6, 12);
    doe_head.sub_groups = vec!["Choir".to_string(), "Men's Fellowship".to_string()];
    doe_head.avatar_url = Some("https://placehold.co/128x128.png".to_string());
    doe_head.home_parish = Some("St. Peter's Cathedral".to_string());
    doe_head.native_district = Some("Kottayam".to_string());
    let mut doe = Family::new("1", doe_head);
    doe.family_id = Some("24/PM/0001".to_string());
    doe.family_name = Some("Doe Family".to_string());
    doe.zone = Some("North Zone".to_string());
    doe.ward = Some("Ward 1".to_string());
    doe.join_date = demo_join(2018, 3, 15);
    doe.password = Some(SecretString::from("password123".to_string()));
    doe.family = vec![
        demo_member("Jane Doe", Relation::Spouse, demo_date(1987, 9, 2), None),
        demo_member("Jimmy Doe", Relation::Son, demo_date(2012, 1, 15), Some("Sunday School")),
        demo_member("Jenny Doe", Relation::Daughter, demo_date(2014, 2, 25), Some("Sunday School")),
    ];

    let mut smith_head = Person::new("Jane Smith");
    smith_head.email = Some("jane.smith@example.com".to_string());
    smith_head.phone = Some("555-0102".to_string());
    smith_head.address = Some("456 Oak Ave, Anytown".to_string());
    smith_head.birthday = demo_date(1979, 11, 30);
    smith_head.marital_status = MaritalStatus::Married;
    smith_head.wedding_day = demo_date(2015, 8, 14);
    smith_head.sub_groups = vec!["Altar Society".to_string()];
    smith_head.avatar_url = Some("https://placehold.co/128x128.png".to_string());
    smith_head.home_parish = Some("Holy Family Church".to_string());
    smith_head.native_district = Some("Ernakulam".to_string());
    let mut smith = Family::new("2", smith_head);
    smith.family_id = Some("24/PM/0002".to_string());
    smith.family_name = Some("Smith Family".to_string());
    smith.zone = Some("North Zone".to_string());
    smith.ward = Some("Ward 2".to_string());
    smith.join_date = demo_join(2019, 7, 1);
    smith.password = Some(SecretString::from("password123".to_string()));
    smith.family = vec![
        demo_member("John Smith", Relation::Spouse, demo_date(1978, 4, 18), None),
        demo_member("Jake Smith", Relation::Son, demo_date(2016, 12, 31), Some("Sunday School")),
    ];

    let mut jones_head = Person::new("Peter Jones");
    jones_head.email = Some("peter.jones@example.com".to_string());
    jones_head.phone = Some("555-0103".to_string());
    jones_head.status = MemberStatus::Inactive;
    jones_head.birthday = demo_date(1990, 2, 29);
    jones_head.avatar_url = Some("https://placehold.co/128x128.png".to_string());
    let mut jones = Family::new("3", jones_head);
    jones.family_name = Some("Jones Family".to_string());
    jones.zone = Some("South Zone".to_string());
    jones.ward = Some("Ward 1".to_string());
    jones.join_date = demo_join(2020, 1, 10);
    jones.password = Some(SecretString::from("password123".to_string()));

    let mut johnson_head = Person::new("Mary Johnson");
    johnson_head.email = Some("mary.j@example.com".to_string());
    johnson_head.phone = Some("555-0104".to_string());
    johnson_head.birthday = demo_date(1982, 7, 4);
    johnson_head.sub_groups = vec!["Sunday School".to_string(), "Choir".to_string()];
    johnson_head.avatar_url = Some("https://placehold.co/128x128.png".to_string());
    let mut johnson = Family::new("4", johnson_head);
    johnson.family_name = Some("Johnson Family".to_string());
    johnson.zone = Some("South Zone".to_string());
    johnson.ward = Some("Ward 2".to_string());
    johnson.join_date = demo_join(2021, 5, 23);
    johnson.password = Some(SecretString::from("password123".to_string()));
    johnson.family =
        vec![demo_member("Chris Johnson", Relation::Son, demo_date(2010, 10, 10), Some("Youth League"))];

    let mut williams_head = Person::new("David Williams");
    williams_head.email = Some("d.williams@example.com".to_string());
    williams_head.phone = Some("555-0105".to_string());
    williams_head.birthday = demo_date(1975, 3, 3);
    williams_head.marital_status = MaritalStatus::Married;
    williams_head.wedding_day = demo_date(2005, 2, 14);
    williams_head.sub_groups = vec!["Men's Fellowship".to_string()];
    williams_head.avatar_url = Some("https://placehold.co/128x128.png".to_string());
    let mut williams = Family::new("5", williams_head);
    williams.family_name = Some("Williams Family".to_string());
    williams.zone = Some("East Zone".to_string());
    williams.ward = Some("Ward 1".to_string());
    williams.join_date = demo_join(2017, 11, 5);
    williams.password = Some(SecretString::from("password123".to_string()));
    williams.family = vec![demo_member("Susan Williams", Relation::Spouse, demo_date(1976, 8, 22), None)];

    let mut brown_head = Person::new("Linda Brown");
    brown_head.email = Some("linda.b@example.com".to_string());
    brown_head.phone = Some("555-0106".to_string());
    brown_head.birthday = demo_date(1958, 12, 25);
    brown_head.marital_status = MaritalStatus::Widowed;
    brown_head.sub_groups = vec!["Altar Society".to_string()];
    brown_head.avatar_url = Some("https://placehold.co/128x128.png".to_string());
    let mut brown = Family::new("6", brown_head);
    brown.family_name = Some("Brown Family".to_string());
    brown.zone = Some("East Zone".to_string());
    brown.ward = Some("Ward 2".to_string());
    brown.join_date = demo_join(2015, 9, 30);
    brown.password = Some(SecretString::from("password123".to_string()));

    vec![admin, doe, smith, jones, johnson, williams, brown]
}

fn demo_member(name: &str, relation: Relation, birthday: Option<NaiveDate>, group: Option<&str>) -> Person {
    let mut person = Person::new(name);
    person.relation = Some(relation);
    person.birthday = birthday;
    person.sub_groups = group.map(|g| vec![g.to_string()]).unwrap_or_default();
    person.avatar_url = Some("https://placehold.co/128x128.png".to_string());
    person
}

fn demo_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn demo_join(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single()
}
