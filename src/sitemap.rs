use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::info;
use url::Url;

use crate::collab::PageFetcher;
use crate::error::CollabResult;

/// Fetch `<site>/sitemap.xml` and return every `<loc>` URL it lists.
pub async fn fetch_sitemap_urls(fetcher: &dyn PageFetcher, site: &Url) -> CollabResult<Vec<String>> {
    let sitemap_url = site.join("/sitemap.xml")?;
    info!("Fetching sitemap: {}", sitemap_url);
    let page = fetcher.fetch(sitemap_url.as_str()).await?;
    let urls = parse_urlset(&page.body)?;
    info!("Total URLs in sitemap: {}", urls.len());
    Ok(urls)
}

/// Parse a urlset (or sitemap index) XML and return all <loc> URLs.
pub fn parse_urlset(xml: &str) -> CollabResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut urls = Vec::new();
    let mut in_entry = false;
    let mut in_loc = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"url" | b"sitemap" => in_entry = true,
                b"loc" if in_entry => in_loc = true,
                _ => {}
            },
            Ok(Event::Text(e)) if in_loc => {
                let loc = e.unescape()?;
                let loc = loc.trim();
                if !loc.is_empty() {
                    urls.push(loc.to_string());
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"loc" => in_loc = false,
                b"url" | b"sitemap" => in_entry = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }
    Ok(urls)
}
