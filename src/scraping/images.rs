use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

use super::base;

static PICTURE_SOURCE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"picture source[media="(min-width: 1240px)"][type="image/jpeg"]"#)
        .expect("picture source selector")
});
static IMG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("img selector"));

/// Fallback order for plain <img> nodes once no structured <picture> variant
/// matched. The srcset entry resolves to its last listed candidate.
const IMG_ATTR_PRIORITY: [&str; 3] = ["srcset", "data-src", "src"];

/// Resolves the best image URL for one listing item, substituting the
/// configured placeholder when nothing usable is present. The placeholder
/// substitution is intentional: the record keeps a displayable image even
/// though every other missing field defaults to None.
pub fn resolve(item: &ElementRef<'_>, base_url: &str, default_url: &str) -> String {
    resolve_candidate(item, base_url).unwrap_or_else(|| default_url.to_string())
}

fn resolve_candidate(item: &ElementRef<'_>, base_url: &str) -> Option<String> {
    if let Some(srcset) = base::first_attr(item, &PICTURE_SOURCE_SELECTOR, "data-srcset") {
        if let Some(url) = last_srcset_candidate(&srcset) {
            return base::absolute_url(base_url, Some(url));
        }
    }

    let img = item.select(&IMG_SELECTOR).next()?;
    for attr in IMG_ATTR_PRIORITY {
        let value = match img.value().attr(attr) {
            Some(value) if !value.trim().is_empty() => value.trim(),
            _ => continue,
        };
        let url = if attr == "srcset" {
            match last_srcset_candidate(value) {
                Some(url) => url,
                None => continue,
            }
        } else {
            value.to_string()
        };
        return base::absolute_url(base_url, Some(url));
    }
    None
}

/// Picks the last (highest-resolution) candidate of a responsive source set,
/// trimming its width descriptor.
fn last_srcset_candidate(srcset: &str) -> Option<String> {
    srcset
        .split(',')
        .filter_map(|part| part.split_whitespace().next())
        .filter(|url| !url.is_empty())
        .last()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const BASE_URL: &str = "https://www.mojo.nl";
    const DEFAULT_URL: &str = "https://www.mojo.nl/media/default-event.jpg";

    fn resolve_fragment(html: &str) -> String {
        let document = Html::parse_fragment(html);
        let root_selector = Selector::parse("div.item").expect("root selector");
        let item = document
            .select(&root_selector)
            .next()
            .expect("fragment root");
        resolve(&item, BASE_URL, DEFAULT_URL)
    }

    #[test]
    fn prefers_matching_picture_source() {
        let resolved = resolve_fragment(
            r#"<div class="item"><picture>
                <source media="(min-width: 1240px)" type="image/webp" data-srcset="/media/a.webp 1240w">
                <source media="(min-width: 1240px)" type="image/jpeg" data-srcset="/media/a.jpg 620w, /media/b.jpg 1240w">
                <img src="/media/fallback.jpg">
            </picture></div>"#,
        );
        assert_eq!(resolved, "https://www.mojo.nl/media/b.jpg");
    }

    #[test]
    fn srcset_resolves_to_last_candidate() {
        let resolved =
            resolve_fragment(r#"<div class="item"><img srcset="a.jpg 100w, b.jpg 800w"></div>"#);
        assert_eq!(resolved, "https://www.mojo.nl/b.jpg");
    }

    #[test]
    fn falls_back_to_lazy_load_source() {
        let resolved =
            resolve_fragment(r#"<div class="item"><img data-src="/media/lazy.jpg"></div>"#);
        assert_eq!(resolved, "https://www.mojo.nl/media/lazy.jpg");
    }

    #[test]
    fn falls_back_to_plain_source() {
        let resolved =
            resolve_fragment(r#"<div class="item"><img src="https://cdn.example.com/x.jpg"></div>"#);
        assert_eq!(resolved, "https://cdn.example.com/x.jpg");
    }

    #[test]
    fn empty_srcset_does_not_mask_later_attributes() {
        let resolved = resolve_fragment(
            r#"<div class="item"><img srcset="  " data-src="/media/lazy.jpg"></div>"#,
        );
        assert_eq!(resolved, "https://www.mojo.nl/media/lazy.jpg");
    }

    #[test]
    fn substitutes_placeholder_when_no_sources_exist() {
        let resolved = resolve_fragment(r#"<div class="item"><p>no image here</p></div>"#);
        assert_eq!(resolved, DEFAULT_URL);
    }
}
