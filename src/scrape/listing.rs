use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::document::Node;
use crate::error::ScrapeError;
use crate::scrape::ElectionLink;

/// Label of the listing entry that only repeats elections linked elsewhere.
pub const PRIOR_ELECTIONS_LABEL: &str = "Prior Elections";

static ELECTION_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.*&electNav=\d+").expect("invalid election link regex"));

struct RawLink {
    href: String,
    label: String,
}

/// Extracts the qualifying election links from the listing page.
///
/// The listing shows the most recent election first, so the first link gets
/// the highest `sort_index` and the last one gets 1.
pub fn parse_listing<N: Node>(root: &N, base_url: &Url) -> Result<Vec<ElectionLink>, ScrapeError> {
    let mut raw = Vec::new();
    for link in root.find_all("a[href]") {
        let Some(href) = link.attribute("href") else {
            continue;
        };
        if !ELECTION_LINK.is_match(href) {
            continue;
        }
        let label = link
            .next_sibling("span")
            .map(|span| span.text().trim().to_string())
            .ok_or_else(|| {
                ScrapeError::parse(
                    format!("election link {href:?}"),
                    "no label span follows the link",
                )
            })?;
        if label == PRIOR_ELECTIONS_LABEL {
            continue;
        }
        raw.push(RawLink {
            href: href.to_string(),
            label,
        });
    }

    let total = raw.len();
    raw.into_iter()
        .enumerate()
        .map(|(i, link)| {
            let page_reference = base_url.join(&link.href).map_err(|e| {
                ScrapeError::parse(format!("election link {:?}", link.href), e.to_string())
            })?;
            Ok(ElectionLink {
                page_reference: page_reference.to_string(),
                election_year: election_year(&link.label)?,
                election_name: link.label,
                sort_index: sort_index(total, i),
            })
        })
        .collect()
}

/// Year encoded in the first four characters of an election name.
pub fn election_year(name: &str) -> Result<i32, ScrapeError> {
    let prefix: String = name.chars().take(4).collect();
    if prefix.chars().count() < 4 {
        return Err(ScrapeError::parse(
            format!("election name {name:?}"),
            "shorter than a four digit year",
        ));
    }
    // Only plain ASCII digits; `str::parse` would also accept a sign.
    prefix
        .bytes()
        .try_fold(0i32, |year, b| {
            b.is_ascii_digit().then(|| year * 10 + i32::from(b - b'0'))
        })
        .ok_or_else(|| {
            ScrapeError::parse(
                format!("election name {name:?}"),
                format!("{prefix:?} is not a year"),
            )
        })
}

fn sort_index(total: usize, position: usize) -> u32 {
    (total - position) as u32
}
