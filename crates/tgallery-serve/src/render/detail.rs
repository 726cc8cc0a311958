//! Detail page renderer.
//!
//! Layout: the image on a blurred copy of itself, an info panel with title,
//! id, tag pills and a download link, then a grid of related images.

use maud::{Markup, html};

use super::components::{header, image_src, page_shell, tag_href, truncate_chars};
use crate::detail::DetailContext;

/// Longest caption excerpt used for the meta description.
const DESCRIPTION_CHARS: usize = 160;

/// Render a detail context into a complete HTML page.
pub fn render(ctx: &DetailContext, site_name: &str) -> Markup {
    let src = image_src(&ctx.record.file_name);
    let description = ctx
        .record
        .caption
        .as_deref()
        .map(|caption| truncate_chars(caption.trim(), DESCRIPTION_CHARS))
        .filter(|caption| !caption.is_empty())
        .unwrap_or_else(|| ctx.title.clone());

    let body = html! {
        (header(site_name, html! {}))
        div class="container" {
            div class="detail" {
                div class="detail-image panel" {
                    img src=(src) alt=(ctx.title);
                }
                div class="detail-side" {
                    div class="detail-info panel" {
                        h1 { (ctx.title) }
                        div class="detail-id" { "ID: " (ctx.record.id) }
                        @if !ctx.tags.is_empty() {
                            div class="tags" {
                                @for tag in &ctx.tags {
                                    a class="tag-pill" href=(tag_href(tag)) { "#" (tag) }
                                }
                            }
                        }
                        a class="download" href=(src) download { "Download original" }
                    }
                    @if !ctx.related.is_empty() {
                        div class="related" {
                            @for related in &ctx.related {
                                a href=(format!("/detail/{}", related.id)) title=(related.title()) {
                                    img src=(image_src(&related.file_name)) alt=(related.title()) loading="lazy";
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    page_shell(
        &format!("{} - {site_name}", ctx.title),
        &description,
        site_name,
        Some(&src),
        body,
    )
}
