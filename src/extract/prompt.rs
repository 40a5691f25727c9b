//! Prompt templates for the model-based extractor

/// Prompt asking for the candidate records on a list page
pub fn list_prompt(cleaned: &str) -> String {
    format!(
        r#"The following HTML is a list page of grants and calls for tenders. Extract every listed item.

Rules:
- Filling in every field is the top priority.
- Find the URL of each item's own detail page (URLs containing tender-details, opportunity-details or similar).
- If an amount, a date or a status is shown in the list, extract it.
- Use "unknown" only for values that are genuinely absent.

Fields per item:
- url, title
- issuingOrganization
- amount
- publicationDate (MM-dd-yyyy)
- articleType (Open/Closed/Forecasted)

Pagination:
- next_page_selector: a CSS selector for the control that leads to the next list page, or null.

Answer with JSON only:
{{
  "articles": [
    {{
      "url": "...", "title": "...", "issuingOrganization": "...",
      "amount": "...", "publicationDate": "...", "articleType": "..."
    }}
  ],
  "next_page_selector": "css selector or null"
}}

HTML:
{cleaned}
"#
    )
}

/// Prompt asking for every field of a detail page plus ranked follow-up links
pub fn detail_prompt(cleaned: &str, max_deep_links: usize) -> String {
    format!(
        r#"As a web scraping expert, extract every detail of the call described by the following content.
Every value must be filled in.

Rules:
1. Fill in every field of the JSON schema below.
2. When no exact number or date is stated, give the closest related statement (e.g. "budget decided per project", "duration 3 years").
3. If there are several candidates, pick the most recent or the most representative one.
4. Dates use MM-dd-yyyy. If only a year is known, use e.g. 01-01-2025.
5. summary is a short summary in Japanese. Every other value stays in the original language.
6. Answer "unknown" only when the content has no information at all about a field.

Follow-up links:
If any field is still unknown, look for links likely to hold the missing details (full announcement, guidelines, PDF documents, FAQ).
Rank them by how much they would fill in and list at most {max_deep_links} in "next_deep_links".
Prefer PDF links labelled "Call document", "Draft" or "Full text".

Answer with JSON only:
{{
  "extracted_data": {{
    "title": "call title",
    "issuingOrganization": "issuing organization",
    "summary": "summary in Japanese",
    "articleType": "Open/Closed/Forecasted/Misc",
    "publicationDate": "MM-dd-yyyy",
    "country": "ISO 3166 alpha-2",
    "amount": "amount with currency, or budget statement",
    "funder": "funder",
    "fundingType": "Grant/Contract/etc",
    "researchStartDate": "MM-dd-yyyy",
    "researchEndDate": "MM-dd-yyyy",
    "field": "field of study",
    "keywords": "comma separated",
    "description": "detailed description including budget and duration notes"
  }},
  "next_deep_links": ["URL1", "URL2", "URL3"]
}}

Content:
{cleaned}
"#
    )
}
