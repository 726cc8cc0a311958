//! Shared HTML components used across all gallery pages.
//!
//! These are maud functions that return `Markup` fragments for composition
//! into full pages. Every page carries the same sidebar: home, random image,
//! about, and the R-18 filter switch stored in `localStorage`.

use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Tag that marks adult images hidden by the filter switch.
pub const R18_TAG: &str = "R-18";

/// Inline CSS for all gallery pages.
///
/// Dark theme, blurred backdrop layer behind translucent panels.
pub const PAGE_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
:root{--bg:#121212;--fg:#f3f4f6;--fg2:#d1d5db;--fg3:#9ca3af;--accent:#ec4899;--accent2:#9333ea;--panel:rgba(0,0,0,.4);--border:rgba(255,255,255,.1);--mono:"SF Mono",SFMono-Regular,ui-monospace,Menlo,monospace}
body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;background:var(--bg);color:var(--fg);min-height:100vh;overflow-x:hidden}
a{color:inherit;text-decoration:none}
img{display:block;max-width:100%}

#bg-layer{position:fixed;inset:0;z-index:-1;background-size:cover;background-position:center;filter:blur(6px) brightness(.6);transform:scale(1.1) translateZ(0);opacity:0;transition:opacity 1s;pointer-events:none}
#bg-layer.shown{opacity:1}

.header{position:sticky;top:0;z-index:30;display:flex;align-items:center;justify-content:space-between;gap:1rem;padding:.75rem 1rem;background:rgba(0,0,0,.3);backdrop-filter:blur(20px);border-bottom:1px solid var(--border)}
.logo{font-weight:800;font-size:1.1rem;letter-spacing:.06em;color:#fff}
.menu-btn{background:none;border:none;color:#fff;cursor:pointer;padding:.35rem;border-radius:8px;display:flex}
.menu-btn:hover{background:var(--border)}
.menu-btn svg{width:24px;height:24px}

.overlay{position:fixed;inset:0;z-index:40;background:rgba(0,0,0,.5);opacity:0;pointer-events:none;transition:opacity .3s}
.overlay.open{opacity:1;pointer-events:auto}
.sidebar{position:fixed;top:0;left:0;bottom:0;z-index:50;width:260px;display:flex;flex-direction:column;background:rgba(17,17,17,.95);border-right:1px solid var(--border);transform:translateX(-100%);transition:transform .3s}
.sidebar.open{transform:none}
.sidebar-title{padding:1.25rem 1rem;font-weight:800;letter-spacing:.06em;border-bottom:1px solid var(--border)}
.sidebar nav{flex:1;padding:.75rem;display:flex;flex-direction:column;gap:.25rem}
.sidebar nav a{display:block;padding:.7rem .75rem;border-radius:8px;color:var(--fg2)}
.sidebar nav a:hover{background:var(--border);color:#fff}
.sidebar-switch{display:flex;align-items:center;justify-content:space-between;margin-top:.75rem;padding:.9rem .75rem 0;border-top:1px solid var(--border);color:var(--fg2)}
.sidebar-switch input{width:1.1rem;height:1.1rem;accent-color:var(--accent)}
.sidebar-foot{padding:1rem;font-size:.75rem;text-align:center;color:var(--fg3);border-top:1px solid var(--border)}

.search-bar{flex:1;max-width:400px}
.search-bar input{width:100%;padding:.5rem 1rem;border-radius:99px;border:1px solid var(--border);background:rgba(255,255,255,.1);color:#fff;font-size:.9rem;outline:none}
.search-bar input:focus{background:rgba(0,0,0,.6);border-color:var(--accent)}

.gallery{column-count:2;column-gap:8px;padding:8px}
.card{display:block;position:relative;break-inside:avoid;margin-bottom:8px;border-radius:10px;overflow:hidden;background:#2a2a2a;box-shadow:0 4px 6px rgba(0,0,0,.3);transition:transform .2s}
.card img{width:100%;height:auto;background:#222}
.card .meta{position:absolute;left:0;right:0;bottom:0;padding:1.25rem .5rem .5rem;background:linear-gradient(to top,rgba(0,0,0,.9),transparent)}
.card .title{font-size:.75rem;font-weight:600;white-space:nowrap;overflow:hidden;text-overflow:ellipsis;text-shadow:0 1px 2px #000}
@media(min-width:768px){
.gallery{display:grid;grid-template-columns:repeat(auto-fill,minmax(250px,1fr));grid-auto-rows:250px;grid-auto-flow:dense;gap:16px;padding:20px;max-width:1800px;margin:0 auto}
.card{margin-bottom:0}
.card:nth-child(5n){grid-column:span 2;grid-row:span 2}
.card:nth-child(7n){grid-column:span 2}
.card:nth-child(9n){grid-row:span 2}
.card img{height:100%;object-fit:cover}
.card .meta{opacity:0;transition:opacity .2s}
.card:hover{transform:scale(1.02) translateY(-5px);z-index:20}
.card:hover .meta{opacity:1}
}
.status{padding:2.5rem 0;text-align:center;font-size:.85rem;color:var(--fg3)}

.panel{background:var(--panel);backdrop-filter:blur(12px);border:1px solid var(--border);border-radius:16px}
.container{max-width:1150px;margin:0 auto;padding:1.5rem 1rem}
.detail{display:grid;gap:2rem}
@media(min-width:1024px){.detail{grid-template-columns:2fr 1fr}}
.detail-image{display:flex;align-items:center;justify-content:center;padding:.5rem}
.detail-image img{max-height:85vh;width:auto;object-fit:contain;border-radius:8px}
.detail-side{display:flex;flex-direction:column;gap:1.5rem}
.detail-info{padding:2rem}
.detail-info h1{font-size:1.5rem;line-height:1.35;margin-bottom:.5rem;word-break:break-word}
.detail-id{font-family:var(--mono);font-size:.85rem;color:var(--fg3);margin-bottom:1.5rem}
.tags{display:flex;flex-wrap:wrap;gap:.5rem;margin-bottom:2rem}
.tag-pill{padding:4px 10px;border-radius:20px;font-size:.75rem;background:var(--border);color:#f9a8d4;transition:all .2s}
.tag-pill:hover{background:var(--accent);color:#fff}
.download{display:block;padding:.8rem;text-align:center;font-weight:700;border-radius:12px;color:#fff;background:linear-gradient(to right,var(--accent),var(--accent2))}
.related{display:grid;grid-template-columns:1fr 1fr;gap:1rem}
.related a{display:block;aspect-ratio:1;border-radius:12px;overflow:hidden;border:1px solid var(--border)}
.related a:hover{border-color:var(--accent)}
.related img{width:100%;height:100%;object-fit:cover}

.about{max-width:680px;margin:2rem auto;padding:1.5rem 2rem 2rem}
.about h1{font-size:1.6rem;margin-bottom:.5rem}
.about h2{font-size:1.15rem;margin:2rem 0 .75rem;padding-left:.75rem;border-left:4px solid var(--accent)}
.about p{line-height:1.7;color:var(--fg2);margin-bottom:.75rem}
.about code{font-family:var(--mono);font-size:.85em;padding:2px 6px;border-radius:4px;background:rgba(255,255,255,.15);color:#f9a8d4}
.about .foot{margin-top:2.5rem;padding-top:1.5rem;border-top:1px solid var(--border);text-align:center;font-size:.75rem;color:var(--fg3)}
"#;

/// Inline CSS for error pages.
pub const ERROR_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;display:flex;justify-content:center;align-items:center;min-height:100vh;background:#121212;color:#e0e0e8;padding:1rem}
.error-page{text-align:center;max-width:400px}
.error-page h1{font-size:1.5rem;margin-bottom:.75rem}
.error-page p{color:#aaa;margin-bottom:1rem;line-height:1.5}
.error-page a{color:#f472b6}
"#;

/// Content-Security-Policy header value.
///
/// Only same-origin images and fetches; inline styles and scripts only.
pub const CSP_HEADER: &str = "default-src 'none'; style-src 'unsafe-inline'; script-src 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; form-action 'none'; frame-ancestors 'none'";

/// Sidebar behaviour shared by every page.
const SIDEBAR_JS: &str = r#"
function toggleSidebar(){
  document.getElementById('sidebar').classList.toggle('open');
  document.getElementById('overlay').classList.toggle('open');
}
async function randomImage(ev){
  if(ev)ev.preventDefault();
  try{
    const res=await fetch('/api/posts?q=random');
    if(!res.ok)return;
    const data=await res.json();
    if(data.length)window.location.href='/detail/'+data[0].id;
  }catch(e){console.error(e);}
}
function toggleR18(el){
  localStorage.setItem('hide_r18',el.checked);
  location.reload();
}
document.getElementById('r18-toggle').checked=localStorage.getItem('hide_r18')==='true';
"#;

/// Menu icon (three bars).
const ICON_MENU: &str = r#"<svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round"><path d="M3 12h18M3 6h18M3 18h18"/></svg>"#;

/// Render the full HTML page shell with `<head>`, sidebar and body content.
///
/// `backdrop` seeds the blurred background layer; pages without one get a
/// random image from the client script instead.
pub fn page_shell(
    title: &str,
    description: &str,
    site_name: &str,
    backdrop: Option<&str>,
    body_content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                meta name="description" content=(description);
                meta property="og:title" content=(title);
                meta property="og:description" content=(description);
                meta property="og:site_name" content=(site_name);
                meta property="og:type" content="website";
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                @if let Some(src) = backdrop.filter(|src| is_css_safe(src)) {
                    div id="bg-layer" class="shown" style=(format!("background-image:url('{src}')")) {}
                } @else {
                    div id="bg-layer" {}
                }
                (sidebar(site_name))
                (body_content)
                script { (PreEscaped(SIDEBAR_JS)) }
            }
        }
    }
}

/// Sticky header with the menu button and the site logo.
///
/// `middle` fills the space between them (the search bar on the home page).
pub fn header(site_name: &str, middle: Markup) -> Markup {
    html! {
        div class="header" {
            button class="menu-btn" type="button" onclick="toggleSidebar()" aria-label="Menu" {
                (PreEscaped(ICON_MENU))
            }
            (middle)
            a href="/" class="logo" { (site_name) }
        }
    }
}

/// Slide-in navigation with the R-18 filter switch.
fn sidebar(site_name: &str) -> Markup {
    html! {
        div id="overlay" class="overlay" onclick="toggleSidebar()" {}
        aside id="sidebar" class="sidebar" {
            div class="sidebar-title" { (site_name) }
            nav {
                a href="/" { "Home" }
                a href="/" onclick="randomImage(event)" { "Random image" }
                a href="/about" { "About" }
                label class="sidebar-switch" {
                    span { "Hide " (R18_TAG) }
                    input type="checkbox" id="r18-toggle" onchange="toggleR18(this)";
                }
            }
            div class="sidebar-foot" { (site_name) }
        }
    }
}

/// Same-origin URL of the image proxy for a stored file id.
pub fn image_src(file_name: &str) -> String {
    format!("/image/{file_name}")
}

/// Whether `src` can be placed inside a CSS `url('…')` unchanged.
fn is_css_safe(src: &str) -> bool {
    src.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'))
}

/// Home page link filtered to a single tag.
pub fn tag_href(tag: &str) -> String {
    format!("/?q={}", urlencoding::encode(tag))
}

/// Shorten `s` to at most `max_chars` characters, appending an ellipsis.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}…", &s[..end]),
        None => s.to_string(),
    }
}
