use wasm_bindgen::JsValue;
use web_sys::UrlSearchParams;

use machigai_core::{parse_seed, seed_from_unit, SEED_QUERY_PARAM};

pub(crate) const TEMPLATE_QUERY_PARAM: &str = "template";
pub(crate) const DEFAULT_TEMPLATE: &str = "default";

fn location_search() -> Option<String> {
    let window = web_sys::window()?;
    window.location().search().ok()
}

/// Seed carried by a `?seed=` query string, if it parses.
pub(crate) fn seed_from_search(search: &str) -> Option<u32> {
    let params = UrlSearchParams::new_with_str(search).ok()?;
    let raw = params.get(SEED_QUERY_PARAM)?;
    parse_seed(&raw).ok()
}

pub(crate) fn fresh_seed() -> u32 {
    seed_from_unit(js_sys::Math::random())
}

/// Seed from the page URL, or a new one when absent or unparseable.
pub(crate) fn initial_seed() -> u32 {
    let seed = location_search().as_deref().and_then(seed_from_search);
    match seed {
        Some(seed) => seed,
        None => {
            #[cfg(target_arch = "wasm32")]
            {
                gloo::console::log!("router: no usable seed in url, drawing a fresh one");
            }
            fresh_seed()
        }
    }
}

pub(crate) fn template_name() -> String {
    location_search()
        .and_then(|search| UrlSearchParams::new_with_str(&search).ok())
        .and_then(|params| params.get(TEMPLATE_QUERY_PARAM))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string())
}

/// `search` with the seed parameter replaced, other parameters kept in order.
pub(crate) fn share_search(search: &str, seed: u32) -> String {
    let Ok(params) = UrlSearchParams::new_with_str(search) else {
        return format!("?{SEED_QUERY_PARAM}={seed}");
    };
    params.set(SEED_QUERY_PARAM, &seed.to_string());
    format!("?{}", String::from(params.to_string()))
}

/// Rewrites the address bar so the current puzzle can be shared. Returns the
/// resulting URL.
pub(crate) fn write_seed(seed: u32) -> Option<String> {
    let window = web_sys::window()?;
    let location = window.location();
    let path = location.pathname().unwrap_or_default();
    let search = location.search().unwrap_or_default();
    let hash = location.hash().unwrap_or_default();
    let new_url = format!("{path}{}{hash}", share_search(&search, seed));
    let history = window.history().ok()?;
    if history
        .replace_state_with_url(&JsValue::NULL, "", Some(&new_url))
        .is_err()
    {
        #[cfg(target_arch = "wasm32")]
        {
            gloo::console::warn!("router: replace_state failed");
        }
        return None;
    }
    location.href().ok()
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn seed_is_read_from_query() {
        console_error_panic_hook::set_once();
        assert_eq!(seed_from_search("?seed=42"), Some(42));
        assert_eq!(seed_from_search("?template=park&seed=0x10"), Some(16));
        assert_eq!(seed_from_search("?seed=banana"), None);
        assert_eq!(seed_from_search(""), None);
    }

    #[wasm_bindgen_test]
    fn share_search_replaces_seed_and_keeps_template() {
        assert_eq!(share_search("?template=park&seed=1", 7), "?template=park&seed=7");
        assert_eq!(share_search("", 99), "?seed=99");
    }

    #[wasm_bindgen_test]
    fn fresh_seeds_stay_in_range() {
        for _ in 0..32 {
            assert!(fresh_seed() < machigai_core::SEED_RANGE);
        }
    }
}
