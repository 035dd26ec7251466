use std::collections::HashMap;

use log::{error, info, warn};
use scraper::{ElementRef, Html, Selector};

use crate::{
    error::{Error, Result},
    requests::RequestClient,
    text_manipulators::extract_text,
};

/// Dropdown label -> option values, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionCatalog {
    dimensions: HashMap<String, Vec<String>>,
}

impl DimensionCatalog {
    pub fn insert(&mut self, label: impl Into<String>, values: Vec<String>) {
        self.dimensions.insert(label.into(), values);
    }

    /// Values for `label`, empty when the page had no such dropdown.
    pub fn lookup(&self, label: &str) -> &[String] {
        self.dimensions
            .get(label)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.dimensions.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }
}

/// Discovers the values offered by the `<select>` dropdowns of a page.
pub struct DropdownScraper {
    page_url: String,
    dropdown_class: String,
    dropdown_selector: Selector,
    label_paragraph_selector: Selector,
    option_selector: Selector,
}

impl DropdownScraper {
    /// Fails only when `dropdown_class` cannot form a CSS selector.
    pub fn new(page_url: impl Into<String>, dropdown_class: &str) -> Result<Self> {
        let dropdown_selector = parse_selector(&format!("select.{dropdown_class}"))?;
        Ok(Self {
            page_url: page_url.into(),
            dropdown_class: dropdown_class.to_string(),
            dropdown_selector,
            label_paragraph_selector: parse_selector("p")?,
            option_selector: parse_selector("option")?,
        })
    }

    /// Fetches and parses the page. A failed fetch is logged and yields an
    /// empty catalog so the caller's run proceeds with no work.
    pub async fn discover(&self, request_client: &RequestClient) -> DimensionCatalog {
        info!("Discovering dropdown values from {}", self.page_url);
        match self.fetch_page(request_client).await {
            Ok(html) => self.parse(&html),
            Err(e) => {
                error!("{e}");
                DimensionCatalog::default()
            }
        }
    }

    async fn fetch_page(&self, request_client: &RequestClient) -> Result<String> {
        request_client
            .fetch_url_body(&self.page_url)
            .await
            .map_err(|e| Error::PageFetch {
                message: e.to_string(),
                url: self.page_url.clone(),
            })
    }

    pub fn parse(&self, html: &str) -> DimensionCatalog {
        let document = Html::parse_document(html);
        let mut catalog = DimensionCatalog::default();

        let dropdowns: Vec<ElementRef> = document.select(&self.dropdown_selector).collect();
        if dropdowns.is_empty() {
            warn!("No dropdown found with class {}", self.dropdown_class);
        }

        for (index, dropdown) in dropdowns.into_iter().enumerate() {
            let label = self
                .dropdown_label(dropdown)
                .unwrap_or_else(|| format!("Dropdown_{index}"));

            let values: Vec<String> = dropdown
                .select(&self.option_selector)
                .map(extract_text)
                .filter(|text| !text.is_empty())
                .collect();

            if values.is_empty() {
                warn!("No options available for dropdown {index} ({label})");
                continue;
            }
            catalog.insert(label, values);
        }
        catalog
    }

    // The description lives in a <p> inside the <label> wrapping the <select>.
    fn dropdown_label(&self, dropdown: ElementRef) -> Option<String> {
        let label = dropdown
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name() == "label")?;
        let description = label.select(&self.label_paragraph_selector).next()?;
        let text = extract_text(description);
        (!text.is_empty()).then_some(text)
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Selector(format!("{selector}: {e}")))
}
