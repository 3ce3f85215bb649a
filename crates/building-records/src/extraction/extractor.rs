//! Flattening of Building Record documents into table rows

use crate::error::Result;
use crate::types::BuildingRecord;

use super::schema::{BuildingRecordDocument, BuildingRecordElement, GlobalDetails};
use super::tree::{parse_document, DEFAULT_MAX_DEPTH};

/// Separator between description-of-work items
pub const WORK_ITEM_SEPARATOR: &str = " | ";

/// Extracts building records from one XML document
#[derive(Debug, Clone)]
pub struct Extractor {
    max_depth: usize,
}

impl Extractor {
    /// Create an extractor with a nesting bound
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Extract every building record of `document_text`, in document order
    ///
    /// Malformed markup fails with `Error::Parse`; the document then
    /// contributes no records at all. `source_file` is left empty.
    pub fn extract(&self, document_text: &str) -> Result<Vec<BuildingRecord>> {
        let root = parse_document(document_text, self.max_depth)?;
        let document = BuildingRecordDocument::decode(&root);

        Ok(document
            .records
            .iter()
            .map(|element| flatten(&document.global, element))
            .collect())
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

/// Extract with default settings
pub fn extract(document_text: &str) -> Result<Vec<BuildingRecord>> {
    Extractor::default().extract(document_text)
}

fn flatten(global: &GlobalDetails, element: &BuildingRecordElement) -> BuildingRecord {
    let mut record = BuildingRecord {
        sender_code: global.sender_code.clone(),
        local_authority_code: global.local_authority_code.clone(),
        submission_date: global.submission_date.clone(),
        sender_email: global.sender_email.clone(),
        sender_phone: global.sender_phone.clone(),
        ..Default::default()
    };

    if let Some(status) = &element.status {
        record.status_type = status.status_type.clone();
    }

    if let Some(details) = &element.record {
        record.record_type = details.record_type.clone();
    }

    if let Some(work_address) = &element.work_address {
        if let Some(address) = &work_address.address {
            record.number_name = address.number_name.clone();
            record.street = address.street.clone();
            record.locality = address.locality.clone();
            record.town_city = address.town_city.clone();
            record.county = title_case(&address.county);
            record.post_code = address.post_code.clone();
        }
        record.work_address_uprn = work_address.uprn;
        record.type_of_property = work_address.type_of_property.clone();
    }

    if let Some(work) = &element.work {
        record.sender_unique_record_id = work.sender_unique_record_id.clone();
        record.cp_scheme_certificate_ref = work.cp_scheme_certificate_ref.clone();
        record.commissioning_required = work.commissioning_required.clone();
        record.commissioning_carried_out = work.commissioning_carried_out.clone();
        record.date_work_completed = work.date_work_completed.clone();
    }

    if let Some(description) = &element.description {
        record.work_description = description.items.join(WORK_ITEM_SEPARATOR);
    }

    if let Some(contact) = &element.contact {
        record.contact_type = contact.contact_type.clone();
        record.installer_registered_name = contact.installer_registered_name.clone();
        record.person_registration_id = contact.person_registration_id.clone();
        record.telephone_no = contact.telephone_no.clone();
    }

    record
}

/// Title-case words: a letter following a letter is lowercased, any other
/// letter is uppercased ("west YORKSHIRE" -> "West Yorkshire").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const FULL_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<BuildingRecords>
  <GlobalDetails>
    <SenderCode>CERTAS</SenderCode>
    <LocalAuthorityCode>4720</LocalAuthorityCode>
    <SubmissionDate>2024-03-01</SubmissionDate>
    <SenderResponseEmailAddress>returns@certas.example</SenderResponseEmailAddress>
    <SenderResponsePhoneNo>0330 000 0000</SenderResponsePhoneNo>
  </GlobalDetails>
  <BuildingRecord>
    <StatusDetails><StatusType>New</StatusType></StatusDetails>
    <RecordDetails><RecordType>Notification</RecordType></RecordDetails>
    <WorkAddressDetails>
      <WorkAddress>
        <NumberName>12</NumberName>
        <Street>High Street</Street>
        <Locality>Headingley</Locality>
        <TownCity>Leeds</TownCity>
        <County>west yorkshire</County>
        <PostCode>LS6 1AA</PostCode>
      </WorkAddress>
      <WorkAddressUprn>12345</WorkAddressUprn>
      <TypeOfProperty>House</TypeOfProperty>
    </WorkAddressDetails>
    <WorkDetails>
      <SenderUniqueRecordIdentifier>REC-1</SenderUniqueRecordIdentifier>
      <CPSchemeCertificateReference>CERT-1</CPSchemeCertificateReference>
      <CommissioningRequired>Y</CommissioningRequired>
      <CommissioningCarriedOut>Y</CommissioningCarriedOut>
      <DateWorkCompleted>2024-02-20</DateWorkCompleted>
    </WorkDetails>
    <WorkDescription>
      <DescriptionOfWorkItem>Boiler install</DescriptionOfWorkItem>
      <DescriptionOfWorkItem></DescriptionOfWorkItem>
      <DescriptionOfWorkItem>Flue check</DescriptionOfWorkItem>
    </WorkDescription>
    <ContactInformation>
      <ContactDetails>
        <ContactType>Installer</ContactType>
        <InstallerRegisteredName>Acme Heating Ltd</InstallerRegisteredName>
        <PersonRegistrationIdentifier>P-77</PersonRegistrationIdentifier>
        <TelephoneNo>0113 000 0000</TelephoneNo>
      </ContactDetails>
    </ContactInformation>
  </BuildingRecord>
  <BuildingRecord>
    <WorkAddressDetails>
      <WorkAddressUprn>12a</WorkAddressUprn>
    </WorkAddressDetails>
    <WorkDetails>
      <DateWorkCompleted>2024-01-05</DateWorkCompleted>
    </WorkDetails>
  </BuildingRecord>
</BuildingRecords>"#;

    #[test]
    fn test_extract_full_record() {
        let records = extract(FULL_DOCUMENT).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.sender_code, "CERTAS");
        assert_eq!(first.local_authority_code, "4720");
        assert_eq!(first.status_type, "New");
        assert_eq!(first.record_type, "Notification");
        assert_eq!(first.street, "High Street");
        assert_eq!(first.county, "West Yorkshire");
        assert_eq!(first.work_address_uprn, Some(12345));
        assert_eq!(first.type_of_property, "House");
        assert_eq!(first.cp_scheme_certificate_ref, "CERT-1");
        assert_eq!(first.work_description, "Boiler install | Flue check");
        assert_eq!(first.installer_registered_name, "Acme Heating Ltd");
        assert_eq!(first.source_file, "");
    }

    #[test]
    fn test_absent_sections_default_to_empty() {
        let records = extract(FULL_DOCUMENT).unwrap();
        let second = &records[1];

        assert_eq!(second.status_type, "");
        assert_eq!(second.street, "");
        assert_eq!(second.county, "");
        assert_eq!(second.work_address_uprn, None);
        assert_eq!(second.work_description, "");
        assert_eq!(second.contact_type, "");
        assert_eq!(second.date_work_completed, "2024-01-05");
    }

    #[test]
    fn test_global_fields_shared_across_records() {
        let records = extract(FULL_DOCUMENT).unwrap();
        for record in &records {
            assert_eq!(record.sender_code, "CERTAS");
            assert_eq!(record.submission_date, "2024-03-01");
            assert_eq!(record.sender_email, "returns@certas.example");
            assert_eq!(record.sender_phone, "0330 000 0000");
        }
        assert_ne!(records[0].date_work_completed, records[1].date_work_completed);
    }

    #[test]
    fn test_zero_records() {
        let xml = "<BuildingRecords><GlobalDetails><SenderCode>BBA</SenderCode></GlobalDetails></BuildingRecords>";
        assert!(extract(xml).unwrap().is_empty());
    }

    #[test]
    fn test_uprn_zero_is_numeric() {
        let xml = "<R><BuildingRecord><WorkAddressDetails><WorkAddressUprn>0</WorkAddressUprn></WorkAddressDetails></BuildingRecord></R>";
        let records = extract(xml).unwrap();
        assert_eq!(records[0].work_address_uprn, Some(0));
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let result = extract("<BuildingRecords><BuildingRecord></BuildingRecords>");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_malformed_attributes_yield_no_records() {
        let cases = [
            "<R><GlobalDetails><SenderCode a>X</SenderCode></GlobalDetails><BuildingRecord/></R>",
            r#"<R><BuildingRecord id="1" id="2"/></R>"#,
            "<R><BuildingRecord id=1/></R>",
            "<R><1bad/><BuildingRecord/></R>",
        ];
        for xml in cases {
            assert!(matches!(extract(xml), Err(Error::Parse(_))), "accepted {:?}", xml);
        }
    }

    #[test]
    fn test_windows_line_endings_in_text() {
        let xml = "<R>\r\n<BuildingRecord>\r\n<WorkDescription><DescriptionOfWorkItem>a\r\nb</DescriptionOfWorkItem></WorkDescription></BuildingRecord></R>";
        let records = extract(xml).unwrap();
        assert_eq!(records[0].work_description, "a\nb");
    }

    #[test]
    fn test_extract_is_deterministic() {
        let first = extract(FULL_DOCUMENT).unwrap();
        let second = extract(FULL_DOCUMENT).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("west yorkshire"), "West Yorkshire");
        assert_eq!(title_case("WEST YORKSHIRE"), "West Yorkshire");
        assert_eq!(title_case("tyne and wear"), "Tyne And Wear");
        assert_eq!(title_case("north-east lincs"), "North-East Lincs");
        assert_eq!(title_case(""), "");
    }
}
