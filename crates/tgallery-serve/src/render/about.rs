//! About page.

use maud::{Markup, PreEscaped, html};

use super::components::{R18_TAG, header, page_shell};

/// Loads a random image into the backdrop layer.
const BACKDROP_JS: &str = r#"
(async function(){
  try{
    const res=await fetch('/api/posts?q=random');
    if(!res.ok)return;
    const data=await res.json();
    if(data.length>0){
      const bg=document.getElementById('bg-layer');
      bg.style.backgroundImage='url(/image/'+data[0].file_name+')';
      bg.classList.add('shown');
    }
  }catch(e){}
})();
"#;

/// Render the about page.
pub fn render(site_name: &str) -> Markup {
    let body = html! {
        (header(site_name, html! {}))
        div class="container" {
            article class="about panel" {
                h1 { "About " (site_name) }

                h2 { "Prologue" }
                p {
                    "A quiet corner of the web. Every picture here was picked by hand \
                     and posted to a Telegram channel; this site only shows them."
                }

                h2 { "Explore" }
                p {
                    "Follow a " code { "#tag" } " from any picture, search tags and \
                     captions from the home page, or just keep scrolling. The menu \
                     in the top left has a switch that hides images tagged "
                    code { (R18_TAG) } "."
                }

                h2 { "Connect" }
                p {
                    "There is one small public endpoint: "
                    code { "/api/posts?q=random" }
                    " returns a single random picture as JSON."
                }

                p class="foot" { (site_name) }
            }
        }
        script { (PreEscaped(BACKDROP_JS)) }
    };

    page_shell(
        &format!("About - {site_name}"),
        "About this gallery.",
        site_name,
        None,
        body,
    )
}
