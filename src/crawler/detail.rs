//! Detail page extraction
//!
//! A detail page describes one job posting. Company metadata sits in a
//! repeated label/value block structure; the label text decides which
//! company field the paired value belongs to. Labels are looked up in a
//! declarative [`LabelTable`] built from configuration.
//!
//! Missing blocks never fail extraction: fields that are not found stay
//! empty.

use crate::config::{parse_selector, ExtractConfig, LabelConfig};
use crate::storage::CompanyRecord;
use crate::ConfigResult;
use scraper::{ElementRef, Html, Selector};

/// The company fields a block label can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompanyField {
    Name,
    Business,
    Address,
    /// Contact block holding phone numbers
    Contact,
}

/// Maps label texts to company fields
#[derive(Debug, Clone)]
pub struct LabelTable {
    entries: Vec<(String, CompanyField)>,
}

impl LabelTable {
    /// Builds the table from configured label texts
    pub fn from_config(labels: &LabelConfig) -> Self {
        let entries = vec![
            (labels.name.trim().to_string(), CompanyField::Name),
            (labels.business.trim().to_string(), CompanyField::Business),
            (labels.address.trim().to_string(), CompanyField::Address),
            (labels.contact.trim().to_string(), CompanyField::Contact),
        ];
        Self { entries }
    }

    /// Looks up the field for a label, ignoring surrounding whitespace
    pub fn lookup(&self, label: &str) -> Option<CompanyField> {
        let label = label.trim();
        self.entries
            .iter()
            .find(|(text, _)| text == label)
            .map(|(_, field)| *field)
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::from_config(&LabelConfig::default())
    }
}

/// Extracts company records from detail pages
#[derive(Debug, Clone)]
pub struct DetailExtractor {
    block: Selector,
    label: Selector,
    value: Selector,
    phone_icon: Selector,
    phone_title: Selector,
    phone_separator: String,
    labels: LabelTable,
}

impl DetailExtractor {
    /// Builds an extractor from the configured selector rules
    pub fn new(config: &ExtractConfig) -> ConfigResult<Self> {
        Ok(Self {
            block: parse_selector(&config.block_selector)?,
            label: parse_selector(&config.label_selector)?,
            value: parse_selector(&config.value_selector)?,
            phone_icon: parse_selector(&config.phone_icon_selector)?,
            phone_title: parse_selector(&config.phone_title_selector)?,
            phone_separator: config.phone_separator.clone(),
            labels: LabelTable::from_config(&config.labels),
        })
    }

    /// Extracts the company record from a detail page
    ///
    /// Blocks are scanned in document order. Phone numbers come from the
    /// phone-icon elements of the contact block, joined with the separator.
    /// While the phone is still empty after a block, the phone-title text of
    /// that block is used instead; this check runs for every block, so the
    /// first block with a phone title wins when no icon numbers precede it.
    pub fn extract_record(&self, document: &Html, reference: &str) -> CompanyRecord {
        let mut record = CompanyRecord::new(reference);

        for block in document.select(&self.block) {
            let label = collect_text(block, &self.label);

            match self.labels.lookup(&label) {
                Some(CompanyField::Name) => record.name = self.value_text(block),
                Some(CompanyField::Business) => record.business = self.value_text(block),
                Some(CompanyField::Address) => record.address = self.value_text(block),
                Some(CompanyField::Contact) => self.append_phone_numbers(block, &mut record.phone),
                None => {}
            }

            if record.phone.is_empty() {
                record.phone = collect_text(block, &self.phone_title).trim().to_string();
            }
        }

        record
    }

    /// Parses a page body and extracts its record
    pub fn extract_from_body(&self, body: &str, reference: &str) -> CompanyRecord {
        self.extract_record(&Html::parse_document(body), reference)
    }

    fn value_text(&self, block: ElementRef<'_>) -> String {
        collect_text(block, &self.value).trim().to_string()
    }

    fn append_phone_numbers(&self, block: ElementRef<'_>, phone: &mut String) {
        for number in block.select(&self.phone_icon) {
            let number = number.text().collect::<String>();
            let number = number.trim();
            if phone.is_empty() {
                phone.push_str(number);
            } else {
                phone.push_str(&self.phone_separator);
                phone.push_str(number);
            }
        }
    }
}

/// Concatenates the text of every element matching `selector` under `root`
fn collect_text(root: ElementRef<'_>, selector: &Selector) -> String {
    root.select(selector).flat_map(|element| element.text()).collect()
}
