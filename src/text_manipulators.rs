use scraper::ElementRef;

/// Text content of `node` with every text fragment trimmed before joining.
pub fn extract_text(node: ElementRef) -> String {
    node.text().map(str::trim).collect::<String>()
}
