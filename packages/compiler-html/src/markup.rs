//! Markup produced around a compiled component

use once_cell::sync::Lazy;
use regex::Regex;

/// `<link rel="preload" ...>` tags, which renderers emit for resources the
/// theme loads itself
static PRELOAD_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<link rel="preload".*?>"#).expect("valid preload pattern"));

/// Name of the component a compiled script defines and mounts
pub const ROOT_COMPONENT: &str = "App";

pub fn strip_preload_links(html: &str) -> String {
    PRELOAD_LINK.replace_all(html, "").into_owned()
}

/// Markup that server-renders a component and mounts it on the client.
///
/// `id` keeps the mount point unique within a section; the selector is
/// scoped by the section id Liquid fills in at render time.
pub fn mount_component(id: &str, html: &str, js: &str) -> String {
    format!(
        "<div class=\"root root-{id}\">{html}</div>\n\
         <script type=\"module\">\n\
         {js}\n\
         ReactDOMClient.createRoot(document.querySelector('#shopify-section-{{{{section.id}}}} .root-{id}')).render(React.createElement({ROOT_COMPONENT}));\n\
         </script>",
        js = js.trim_end(),
    )
}
