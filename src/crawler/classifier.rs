//! Sitemap document classification
//!
//! A fetched body is either a sitemap index (its entries point at more sitemaps) or
//! a urlset (its entries are page URLs). The root element decides which; nothing else
//! in the document is consulted. Gzip bodies are inflated first and browser-rendered
//! bodies are unwrapped through the rendered-document parser.

use super::frontier::SitemapReference;
use super::parser::{parse_rendered_sitemap, RenderedRoot};
use crate::url::normalize_url;
use crate::HarvestError;
use flate2::read::GzDecoder;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::Read;
use url::Url;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A page URL listed by a urlset, before product filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub url: Url,
}

/// Result of classifying one sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// Child sitemaps, one level deeper than the document itself
    Index(Vec<SitemapReference>),

    /// Page URLs in document order
    Terminal(Vec<CandidateLink>),
}

impl SitemapDocument {
    /// Number of entries in the document
    pub fn len(&self) -> usize {
        match self {
            Self::Index(children) => children.len(),
            Self::Terminal(links) => links.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Root element of a scanned document
#[derive(Debug, PartialEq, Eq)]
enum Root {
    Index,
    Urlset,
    Html,
    Other(String),
}

impl Root {
    fn from_name(name: &[u8]) -> Self {
        match name {
            b"sitemapindex" => Self::Index,
            b"urlset" => Self::Urlset,
            n if n.eq_ignore_ascii_case(b"html") => Self::Html,
            other => Self::Other(String::from_utf8_lossy(other).to_string()),
        }
    }
}

struct Scan {
    root: Root,
    locations: Vec<String>,
}

/// Classifies a fetched sitemap body
///
/// # Procedure
///
/// 1. Inflate the body if it carries the gzip magic bytes
/// 2. Stream the XML and read the root element
///    - `sitemapindex` → `Index`
///    - `urlset` → `Terminal`
///    - `html` → hand the document to the rendered-document parser
///    - anything else → `Parse` error
/// 3. Collect each entry's `<loc>` text, trimmed; empty values are dropped
/// 4. Resolve every location against the document URL
///
/// Locations that cannot be resolved to an HTTP(S) URL are logged and dropped.
///
/// # Errors
///
/// `HarvestError::Parse` for corrupt gzip data, malformed or truncated XML, and
/// documents whose root is neither sitemap element.
pub fn classify(body: &[u8], reference: &SitemapReference) -> Result<SitemapDocument, HarvestError> {
    let url = &reference.url;
    let parse_error = |message: String| HarvestError::Parse {
        url: url.to_string(),
        message,
    };

    let data = inflate(body, url).map_err(parse_error)?;
    let scan = scan_xml(&data).map_err(parse_error)?;

    let (root, locations) = match scan.root {
        Root::Index => (Root::Index, scan.locations),
        Root::Urlset => (Root::Urlset, scan.locations),
        Root::Html => {
            let markup = String::from_utf8_lossy(&data);
            let rendered = parse_rendered_sitemap(&markup).ok_or_else(|| {
                parse_error("rendered page does not contain a sitemap".to_string())
            })?;
            let root = match rendered.root {
                RenderedRoot::Index => Root::Index,
                RenderedRoot::Urlset => Root::Urlset,
            };
            (root, rendered.locations)
        }
        Root::Other(name) => {
            return Err(parse_error(format!("unexpected root element <{}>", name)));
        }
    };

    let resolved = locations.iter().filter_map(|loc| match normalize_url(loc, url) {
        Ok(resolved) => Some(resolved),
        Err(e) => {
            tracing::debug!("Dropping location {:?} in {}: {}", loc, url, e);
            None
        }
    });

    Ok(match root {
        Root::Index => SitemapDocument::Index(resolved.map(|child| reference.child(child)).collect()),
        _ => SitemapDocument::Terminal(resolved.map(|url| CandidateLink { url }).collect()),
    })
}

/// Inflates gzip bodies; everything else is returned as-is
///
/// The magic bytes decide, not the `.gz` suffix: HTTP clients transparently decode
/// `Content-Encoding: gzip`, so a `.xml.gz` URL can arrive already inflated.
fn inflate<'a>(body: &'a [u8], url: &Url) -> Result<Cow<'a, [u8]>, String> {
    if !body.starts_with(&GZIP_MAGIC) {
        if url.path().ends_with(".gz") {
            tracing::debug!("{} is not gzip-compressed, parsing as-is", url);
        }
        return Ok(Cow::Borrowed(body));
    }

    let mut inflated = Vec::new();
    GzDecoder::new(body)
        .read_to_end(&mut inflated)
        .map_err(|e| format!("corrupt gzip archive: {}", e))?;
    Ok(Cow::Owned(inflated))
}

/// Streams the document, stopping early once the root rules out a sitemap
fn scan_xml(data: &[u8]) -> Result<Scan, String> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut root: Option<Root> = None;
    let mut depth = 0usize;
    let mut in_loc = false;
    let mut current = String::new();
    let mut locations = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                if root.is_none() {
                    let found = Root::from_name(e.local_name().as_ref());
                    if matches!(found, Root::Html | Root::Other(_)) {
                        return Ok(Scan {
                            root: found,
                            locations,
                        });
                    }
                    root = Some(found);
                } else if depth == 3 && e.local_name().as_ref() == b"loc" {
                    in_loc = true;
                    current.clear();
                }
            }
            Ok(Event::Empty(e)) => {
                if root.is_none() {
                    // Self-closing root: an empty index or urlset
                    return Ok(Scan {
                        root: Root::from_name(e.local_name().as_ref()),
                        locations,
                    });
                }
            }
            Ok(Event::Text(e)) if in_loc => {
                let text = e.unescape().map_err(|e| format!("bad <loc> text: {}", e))?;
                current.push_str(&text);
            }
            Ok(Event::CData(e)) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::End(_)) => {
                if in_loc && depth == 3 {
                    in_loc = false;
                    let loc = current.trim();
                    if !loc.is_empty() {
                        locations.push(loc.to_string());
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "malformed XML at byte {}: {}",
                    reader.buffer_position(),
                    e
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    match root {
        None => Err("document has no root element".to_string()),
        Some(_) if depth != 0 => Err("document ends before its root element closes".to_string()),
        Some(root) => Ok(Scan { root, locations }),
    }
}
