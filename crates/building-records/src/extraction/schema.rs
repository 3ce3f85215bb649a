//! Typed view of a Building Record document
//!
//! Each optional subsection is decoded once into an `Option` group, so the
//! flattening step never has to re-walk the tree.

use super::tree::XmlElement;

/// Filing-level details shared by every record in a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalDetails {
    pub sender_code: String,
    pub local_authority_code: String,
    pub submission_date: String,
    pub sender_email: String,
    pub sender_phone: String,
}

impl GlobalDetails {
    fn decode(section: &XmlElement) -> Self {
        Self {
            sender_code: section.read_leaf(&["SenderCode"]),
            local_authority_code: section.read_leaf(&["LocalAuthorityCode"]),
            submission_date: section.read_leaf(&["SubmissionDate"]),
            sender_email: section.read_leaf(&["SenderResponseEmailAddress"]),
            sender_phone: section.read_leaf(&["SenderResponsePhoneNo"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusDetails {
    pub status_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDetails {
    pub record_type: String,
}

/// Postal address of the work; county is kept as written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkAddress {
    pub number_name: String,
    pub street: String,
    pub locality: String,
    pub town_city: String,
    pub county: String,
    pub post_code: String,
}

impl WorkAddress {
    fn decode(section: &XmlElement) -> Self {
        Self {
            number_name: section.read_leaf(&["NumberName"]),
            street: section.read_leaf(&["Street"]),
            locality: section.read_leaf(&["Locality"]),
            town_city: section.read_leaf(&["TownCity"]),
            county: section.read_leaf(&["County"]),
            post_code: section.read_leaf(&["PostCode"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkAddressDetails {
    pub address: Option<WorkAddress>,
    pub uprn: Option<u64>,
    pub type_of_property: String,
}

impl WorkAddressDetails {
    fn decode(section: &XmlElement) -> Self {
        Self {
            address: section.child("WorkAddress").map(WorkAddress::decode),
            uprn: parse_uprn(&section.read_leaf(&["WorkAddressUprn"])),
            type_of_property: section.read_leaf(&["TypeOfProperty"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkDetails {
    pub sender_unique_record_id: String,
    pub cp_scheme_certificate_ref: String,
    pub commissioning_required: String,
    pub commissioning_carried_out: String,
    pub date_work_completed: String,
}

impl WorkDetails {
    fn decode(section: &XmlElement) -> Self {
        Self {
            sender_unique_record_id: section.read_leaf(&["SenderUniqueRecordIdentifier"]),
            cp_scheme_certificate_ref: section.read_leaf(&["CPSchemeCertificateReference"]),
            commissioning_required: section.read_leaf(&["CommissioningRequired"]),
            commissioning_carried_out: section.read_leaf(&["CommissioningCarriedOut"]),
            date_work_completed: section.read_leaf(&["DateWorkCompleted"]),
        }
    }
}

/// Non-empty description items in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkDescription {
    pub items: Vec<String>,
}

impl WorkDescription {
    fn decode(section: &XmlElement) -> Self {
        Self {
            items: section
                .children_named("DescriptionOfWorkItem")
                .filter(|item| !item.text.is_empty())
                .map(|item| item.text.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub contact_type: String,
    pub installer_registered_name: String,
    pub person_registration_id: String,
    pub telephone_no: String,
}

impl ContactDetails {
    fn decode(section: &XmlElement) -> Self {
        Self {
            contact_type: section.read_leaf(&["ContactType"]),
            installer_registered_name: section.read_leaf(&["InstallerRegisteredName"]),
            person_registration_id: section.read_leaf(&["PersonRegistrationIdentifier"]),
            telephone_no: section.read_leaf(&["TelephoneNo"]),
        }
    }
}

/// One `BuildingRecord` element with every subsection optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildingRecordElement {
    pub status: Option<StatusDetails>,
    pub record: Option<RecordDetails>,
    pub work_address: Option<WorkAddressDetails>,
    pub work: Option<WorkDetails>,
    pub description: Option<WorkDescription>,
    pub contact: Option<ContactDetails>,
}

impl BuildingRecordElement {
    fn decode(element: &XmlElement) -> Self {
        Self {
            status: element.child("StatusDetails").map(|s| StatusDetails {
                status_type: s.read_leaf(&["StatusType"]),
            }),
            record: element.child("RecordDetails").map(|s| RecordDetails {
                record_type: s.read_leaf(&["RecordType"]),
            }),
            work_address: element
                .child("WorkAddressDetails")
                .map(WorkAddressDetails::decode),
            work: element.child("WorkDetails").map(WorkDetails::decode),
            description: element
                .child("WorkDescription")
                .map(WorkDescription::decode),
            contact: element
                .find(&["ContactInformation", "ContactDetails"])
                .map(ContactDetails::decode),
        }
    }
}

/// A whole filing: its global details and building records in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildingRecordDocument {
    pub global: GlobalDetails,
    pub records: Vec<BuildingRecordElement>,
}

impl BuildingRecordDocument {
    /// Decode from the document's root element
    pub fn decode(root: &XmlElement) -> Self {
        Self {
            global: root
                .child("GlobalDetails")
                .map(GlobalDetails::decode)
                .unwrap_or_default(),
            records: root
                .children_named("BuildingRecord")
                .map(BuildingRecordElement::decode)
                .collect(),
        }
    }
}

/// Parse a UPRN: only a non-empty run of ASCII digits is a number
///
/// Signs, decimals, whitespace, letters and values beyond `u64` yield `None`.
pub fn parse_uprn(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
