//! The flattened building record row

use serde::{Deserialize, Serialize};

/// One Building Record flattened into a table row
///
/// Field order is the column order of the exported table. Every row carries
/// every column; absent optional data is an empty string, except
/// `work_address_uprn` which is `None` when absent or non-numeric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingRecord {
    // Global details, identical for every record of a document
    pub sender_code: String,
    pub local_authority_code: String,
    pub submission_date: String,
    pub sender_email: String,
    pub sender_phone: String,

    pub status_type: String,
    pub record_type: String,

    // Work address
    pub number_name: String,
    pub street: String,
    pub locality: String,
    pub town_city: String,
    pub county: String,
    pub post_code: String,
    pub work_address_uprn: Option<u64>,
    pub type_of_property: String,

    // Work details
    pub sender_unique_record_id: String,
    pub cp_scheme_certificate_ref: String,
    pub commissioning_required: String,
    pub commissioning_carried_out: String,
    pub date_work_completed: String,

    /// Description items joined with `" | "`
    pub work_description: String,

    // Contact details
    pub contact_type: String,
    pub installer_registered_name: String,
    pub person_registration_id: String,
    pub telephone_no: String,

    /// Originating file or archive entry name, set during aggregation
    pub source_file: String,
}

impl BuildingRecord {
    /// Column names in export order
    pub const FIELD_NAMES: [&'static str; 26] = [
        "sender_code",
        "local_authority_code",
        "submission_date",
        "sender_email",
        "sender_phone",
        "status_type",
        "record_type",
        "number_name",
        "street",
        "locality",
        "town_city",
        "county",
        "post_code",
        "work_address_uprn",
        "type_of_property",
        "sender_unique_record_id",
        "cp_scheme_certificate_ref",
        "commissioning_required",
        "commissioning_carried_out",
        "date_work_completed",
        "work_description",
        "contact_type",
        "installer_registered_name",
        "person_registration_id",
        "telephone_no",
        "source_file",
    ];

    /// Human-readable descriptions for the columns that have one
    pub fn column_description(name: &str) -> Option<&'static str> {
        match name {
            "sender_code" => {
                Some("Competent Persons Scheme code (e.g., CERTAS, HETAS, NICEIC, BBA)")
            }
            "local_authority_code" => Some("Code of the local authority receiving the filing"),
            "work_address_uprn" => Some("Unique Property Reference Number of the work address"),
            "work_description" => Some("All description-of-work items joined with ' | '"),
            "date_work_completed" => Some("Date the notified work was completed"),
            "installer_registered_name" => Some("Registered name of the installer"),
            "source_file" => Some("Original XML file name"),
            _ => None,
        }
    }
}
