//! # HTML Template
//!
//! Renders a [`PrintDocument`] as one standalone HTML file.
//!
//! ## Document Shape
//! ```text
//! <!DOCTYPE html>
//! <html>
//!   <head>  charset, title, <style> (@page size, grid in mm)
//!   <body>
//!     <section class="page">        one per page, page break after
//!       <div class="label">         one per label
//!         name (truncated, escaped)
//!         <img src="data:image/png;base64,…">
//!         caption (optional)
//!         MRP: ₹…   [Price: ₹…]
//!     …
//!     <script>  completion barrier over every <img>, then window.print()
//! ```
//!
//! Every image is inlined, so the file renders with no network access.

use serde::{Deserialize, Serialize};

use crate::layout::{GridLayout, LabelCell, Page, PrintDocument};

/// Default wait before printing a document with no images.
pub const DEFAULT_FALLBACK_DELAY_MS: u64 = 500;

// =============================================================================
// Options & Output
// =============================================================================

/// Rendering options for the HTML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOptions {
    /// `<title>` of the print window.
    pub title: String,

    /// Delay before printing when the document holds no images.
    pub fallback_delay_ms: u64,

    /// Give up waiting for images after this long. `None` waits forever.
    pub load_timeout_ms: Option<u64>,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        TemplateOptions {
            title: "Product Labels".to_string(),
            fallback_delay_ms: DEFAULT_FALLBACK_DELAY_MS,
            load_timeout_ms: None,
        }
    }
}

/// A rendered HTML document and the number of `<img>` elements it embeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedHtml {
    pub html: String,
    pub image_count: usize,
}

// =============================================================================
// Rendering
// =============================================================================

/// Renders `document` as a self-contained HTML page.
pub fn render_html(document: &PrintDocument, options: &TemplateOptions) -> RenderedHtml {
    let layout = &document.layout;
    let mut body = String::new();
    for page in &document.pages {
        body.push_str(&render_page(page));
    }

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8"/>
<title>{title}</title>
<style>
{style}
</style>
</head>
<body>
{body}<script>
{script}
</script>
</body>
</html>
"#,
        title = esc(&options.title),
        style = stylesheet(layout, document.profile.is_thermal()),
        body = body,
        script = print_script(options),
    );

    RenderedHtml {
        html,
        image_count: document.image_count(),
    }
}

fn render_page(page: &Page) -> String {
    let mut out = format!("<section class=\"page\" data-page=\"{}\">\n", page.number);
    for cell in &page.cells {
        out.push_str(&render_cell(cell));
    }
    out.push_str("</section>\n");
    out
}

fn render_cell(cell: &LabelCell) -> String {
    let caption = cell
        .image
        .caption
        .as_deref()
        .map(|c| format!("<div class=\"caption\">{}</div>", esc(c)))
        .unwrap_or_default();
    let offer = cell
        .offer_text
        .as_deref()
        .map(|o| format!("<div class=\"offer\">{}</div>", esc(o)))
        .unwrap_or_default();

    format!(
        "<div class=\"label\" data-id=\"{id}\"><div class=\"name\">{name}</div>\
<img src=\"{src}\" width=\"{w}\" height=\"{h}\" alt=\"{alt}\"/>{caption}\
<div class=\"price\">{price}</div>{offer}</div>\n",
        id = esc(cell.item.identifier()),
        name = esc(&cell.display_name),
        src = esc(&cell.image.data_uri),
        w = cell.image.width,
        h = cell.image.height,
        alt = esc(cell.item.encodable_payload()),
        caption = caption,
        price = esc(&cell.price_text),
        offer = offer,
    )
}

fn stylesheet(layout: &GridLayout, thermal: bool) -> String {
    let (name_pt, small_pt) = if thermal { (7, 6) } else { (9, 8) };
    format!(
        "@page {{ size: {pw}mm {ph}mm; margin: 0; }}
* {{ box-sizing: border-box; }}
body {{ margin: 0; font-family: Arial, Helvetica, sans-serif; color: #000; background: #fff; }}
.page {{ width: {pw}mm; height: {ph}mm; padding: {m}mm; display: grid; \
grid-template-columns: repeat({cols}, {lw}mm); grid-auto-rows: {lh}mm; \
column-gap: {cg}mm; row-gap: {rg}mm; overflow: hidden; \
page-break-after: always; break-after: page; }}
.page:last-of-type {{ page-break-after: auto; break-after: auto; }}
.label {{ display: flex; flex-direction: column; align-items: center; justify-content: center; \
overflow: hidden; text-align: center; border: 1px dashed #bbb; padding: 0.5mm; }}
.label img {{ display: block; max-width: 100%; max-height: 55%; width: auto; height: auto; image-rendering: pixelated; }}
.name {{ font-size: {name_pt}pt; font-weight: bold; white-space: nowrap; }}
.caption {{ font-family: 'Courier New', monospace; font-size: {small_pt}pt; letter-spacing: 0.5px; }}
.price {{ font-size: {small_pt}pt; font-weight: bold; }}
.offer {{ font-size: {small_pt}pt; }}
@media print {{ .label {{ border: none; }} }}",
        pw = mm(layout.page_width_mm),
        ph = mm(layout.page_height_mm),
        m = mm(layout.margin_mm),
        cols = layout.columns,
        lw = mm(layout.label_width_mm),
        lh = mm(layout.label_height_mm),
        cg = mm(layout.column_gap_mm),
        rg = mm(layout.row_gap_mm),
        name_pt = name_pt,
        small_pt = small_pt,
    )
}

/// Client-side completion barrier. Each image's `load` or `error` event
/// resolves one slot; printing happens once all slots are resolved.
fn print_script(options: &TemplateOptions) -> String {
    let watchdog = options
        .load_timeout_ms
        .map(|ms| {
            format!(
                "  setTimeout(function () {{\n\
    if (done) return;\n\
    done = true;\n\
    document.body.setAttribute('data-print-error', 'load-timeout');\n\
    console.error('Labels not printed: ' + pending + ' image(s) still loading after {ms} ms');\n\
  }}, {ms});\n",
                ms = ms
            )
        })
        .unwrap_or_default();

    format!(
        "(function () {{
  var images = Array.prototype.slice.call(document.images);
  var pending = images.length;
  var done = false;
  function fire() {{
    if (done) return;
    done = true;
    window.focus();
    window.print();
  }}
  function settle() {{
    pending -= 1;
    if (pending <= 0) fire();
  }}
  if (pending === 0) {{
    setTimeout(fire, {fallback});
    return;
  }}
{watchdog}  images.forEach(function (img) {{
    if (img.complete) {{
      settle();
      return;
    }}
    img.addEventListener('load', settle, {{ once: true }});
    img.addEventListener('error', settle, {{ once: true }});
  }});
}})();",
        fallback = options.fallback_delay_ms,
        watchdog = watchdog,
    )
}

/// Millimetre value trimmed to three decimals.
fn mm(value: f64) -> String {
    let s = format!("{:.3}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

/// Escapes text for HTML content and double-quoted attributes.
pub fn esc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
