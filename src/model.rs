//! Core records of the membership directory.
//
// A `Family` is one store document: the head's attributes sit at the top
// level and dependents are embedded in the `family` array. Field names on
// the wire stay camelCase to match the stored documents and roster files.

use chrono::{DateTime, NaiveDate, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// Record id of the synthetic sign-in account. The account only exists to
/// authenticate; member-facing views hide it by this id.
pub const SIGN_IN_ACCOUNT_ID: &str = "admin";

/// Relationship of an embedded member to the head of the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    Spouse,
    Son,
    Daughter,
    #[serde(rename = "Daughter-in-law")]
    DaughterInLaw,
    #[serde(rename = "Son-in-law")]
    SonInLaw,
    Grandson,
    Granddaughter,
    Mother,
    Father,
    Brother,
    Sister,
    Others,
}

impl Relation {
    /// Parse a roster label such as "Spouse" or "Daughter-in-law".
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "spouse" => Some(Relation::Spouse),
            "son" => Some(Relation::Son),
            "daughter" => Some(Relation::Daughter),
            "daughter-in-law" => Some(Relation::DaughterInLaw),
            "son-in-law" => Some(Relation::SonInLaw),
            "grandson" => Some(Relation::Grandson),
            "granddaughter" => Some(Relation::Granddaughter),
            "mother" => Some(Relation::Mother),
            "father" => Some(Relation::Father),
            "brother" => Some(Relation::Brother),
            "sister" => Some(Relation::Sister),
            "others" => Some(Relation::Others),
            _ => None,
        }
    }
}

/// Whether a member is shown to regular viewers and produces reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    Active,
    Inactive,
}

impl Default for MemberStatus {
    fn default() -> Self {
        MemberStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

impl Default for MaritalStatus {
    fn default() -> Self {
        MaritalStatus::Single
    }
}

/// Directory privilege carried by the head's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Member,
}

impl Default for Role {
    fn default() -> Self {
        Role::Member
    }
}

/// One person, either a head of family or an embedded dependent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub name: String,
    /// Absent on heads; heads are the implicit "self" of their record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<Relation>,
    #[serde(default)]
    pub status: MemberStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub marital_status: MaritalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wedding_day: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_groups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_parish: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_district: Option<String>,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            relation: None,
            status: MemberStatus::Active,
            birthday: None,
            marital_status: MaritalStatus::Single,
            wedding_day: None,
            sub_groups: Vec::new(),
            phone: None,
            email: None,
            address: None,
            avatar_url: None,
            home_parish: None,
            native_district: None,
        }
    }
}

/// A family record keyed by the directory-assigned `id`.
///
/// `family_id` is the parish register number ("24/PM/0001") and acts as the
/// natural key during roster import. The head's attributes are flattened
/// into the document itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(flatten)]
    pub head: Person,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub family: Vec<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_credential"
    )]
    pub password: Option<SecretString>,
}

impl Family {
    pub fn new(id: impl Into<String>, head: Person) -> Self {
        Self {
            id: id.into(),
            family_id: None,
            family_name: None,
            head,
            zone: None,
            ward: None,
            role: Role::Member,
            family: Vec::new(),
            join_date: None,
            password: None,
        }
    }

    /// Copy of the record with the credential stripped. Every read path
    /// hands out sanitized records; the raw credential never leaves the
    /// store layer.
    pub fn sanitized(&self) -> Family {
        let mut family = self.clone();
        family.password = None;
        family
    }
}

/// Caller identity, passed explicitly to operations that require
/// authorization. There is no ambient "current user".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub member_id: String,
}

impl Principal {
    pub fn new(member_id: impl Into<String>) -> Self {
        Self { member_id: member_id.into() }
    }
}

// Store documents keep the plaintext credential; exposure is confined to
// this serializer.
fn serialize_credential<S>(value: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample_family() -> Family {
        let mut head = Person::new("John Doe");
        head.email = Some("john.doe@example.com".to_string());
        head.birthday = NaiveDate::from_ymd_opt(1985, 5, 20);
        head.marital_status = MaritalStatus::Married;
        head.wedding_day = NaiveDate::from_ymd_opt(2010, 6, 12);
        head.sub_groups = vec!["Choir".to_string()];

        let mut daughter = Person::new("Jenny Doe");
        daughter.relation = Some(Relation::Daughter);
        daughter.birthday = NaiveDate::from_ymd_opt(2014, 2, 25);

        let mut family = Family::new("1", head);
        family.family_id = Some("24/PM/0001".to_string());
        family.family_name = Some("Doe Family".to_string());
        family.zone = Some("North Zone".to_string());
        family.ward = Some("Ward 1".to_string());
        family.family = vec![daughter];
        family.join_date = Utc.with_ymd_and_hms(2018, 3, 15, 0, 0, 0).single();
        family.password = Some(SecretString::from("hunter2".to_string()));
        family
    }

    #[test]
    fn test_document_uses_store_vocabulary() {
        let value = serde_json::to_value(sample_family()).unwrap();
        assert_eq!(value["familyId"], "24/PM/0001");
        assert_eq!(value["familyName"], "Doe Family");
        assert_eq!(value["maritalStatus"], "Married");
        assert_eq!(value["weddingDay"], "2010-06-12");
        assert_eq!(value["subGroups"][0], "Choir");
        // The head is flattened into the document itself.
        assert_eq!(value["name"], "John Doe");
        assert_eq!(value["family"][0]["relation"], "Daughter");
        assert_eq!(value["password"], "hunter2");
    }

    #[test]
    fn test_document_round_trip() {
        let encoded = serde_json::to_string(&sample_family()).unwrap();
        let decoded: Family = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.head, sample_family().head);
        assert_eq!(decoded.family_id, Some("24/PM/0001".to_string()));
        assert_eq!(decoded.family.len(), 1);
        assert!(decoded.password.is_some());
    }

    #[test]
    fn test_sanitized_strips_credential() {
        let sanitized = sample_family().sanitized();
        assert!(sanitized.password.is_none());
        let value = serde_json::to_value(sanitized).unwrap();
        assert!(value.get("password").is_none());
    }

    #[test]
    fn test_debug_never_reveals_credential() {
        let rendered = format!("{:?}", sample_family());
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_relation_labels() {
        let cases = vec![
            ("Spouse", Some(Relation::Spouse)),
            ("daughter-in-law", Some(Relation::DaughterInLaw)),
            ("GRANDSON", Some(Relation::Grandson)),
            (" Others ", Some(Relation::Others)),
            ("Cousin", None),
            ("", None),
        ];
        for (label, expected) in cases {
            assert_eq!(Relation::from_label(label), expected, "Failed for label: {:?}", label);
        }
    }

    #[test]
    fn test_hyphenated_relations_serialize_with_document_labels() {
        let encoded = serde_json::to_string(&Relation::DaughterInLaw).unwrap();
        assert_eq!(encoded, "\"Daughter-in-law\"");
        let decoded: Relation = serde_json::from_str("\"Son-in-law\"").unwrap();
        assert_eq!(decoded, Relation::SonInLaw);
    }

    #[test]
    fn test_defaults_for_absent_document_fields() {
        let decoded: Person = serde_json::from_str(r#"{"name": "Solo"}"#).unwrap();
        assert_eq!(decoded.status, MemberStatus::Active);
        assert_eq!(decoded.marital_status, MaritalStatus::Single);
        assert!(decoded.sub_groups.is_empty());
        assert!(decoded.relation.is_none());
    }
}
