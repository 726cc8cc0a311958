//! Home page: search bar plus an infinitely scrolling gallery.
//!
//! The page itself is static. Cards are fetched from `/api/posts` by the
//! inline script and built with `textContent`, so captions never reach the
//! DOM as markup.

use maud::{Markup, PreEscaped, html};

use super::components::{R18_TAG, header, page_shell};
use crate::query::PAGE_SIZE;

/// Client-side paging loop.
///
/// Reads `?q=` from the location so tag links land pre-filtered, advances
/// the offset by the number of rows received, and stops after a short page.
/// A non-2xx listing reply is reported rather than taken for the end.
/// A new search bumps `gen`, so a page still in flight for the old query is
/// discarded when it lands.
const GALLERY_JS: &str = r#"
(function(){
  const grid=document.getElementById('g');
  const status=document.getElementById('status');
  const input=document.getElementById('search');
  const pageSize=parseInt(grid.dataset.pageSize,10);
  const r18Tag=grid.dataset.r18Tag;
  const hideR18=localStorage.getItem('hide_r18')==='true';
  let q=new URLSearchParams(location.search).get('q')||'';
  let offset=0,loading=false,done=false,gen=0;
  input.value=q;

  function card(item){
    const a=document.createElement('a');
    a.className='card';
    a.href='/detail/'+item.id;
    const img=document.createElement('img');
    img.src='/image/'+item.file_name;
    img.loading='lazy';
    img.alt='';
    a.appendChild(img);
    const meta=document.createElement('div');
    meta.className='meta';
    const title=document.createElement('div');
    title.className='title';
    title.textContent=(item.caption||'').split('\n')[0];
    meta.appendChild(title);
    a.appendChild(meta);
    return a;
  }

  function hidden(item){
    return hideR18&&(item.tags||'').split(' ').includes(r18Tag);
  }

  async function load(reset){
    if(reset){gen++;grid.replaceChildren();offset=0;done=false;loading=false;}
    if(loading||done)return;
    const mine=gen;
    loading=true;
    status.style.display='';
    status.textContent='Loading...';
    try{
      const res=await fetch('/api/posts?q='+encodeURIComponent(q)+'&offset='+offset);
      if(mine!==gen)return;
      if(!res.ok){status.textContent='Could not load images.';done=true;return;}
      const data=await res.json();
      if(mine!==gen)return;
      if(offset===0&&data.length>0){
        const bg=document.getElementById('bg-layer');
        bg.style.backgroundImage='url(/image/'+data[0].file_name+')';
        bg.classList.add('shown');
      }
      data.filter(item=>!hidden(item)).forEach(item=>grid.appendChild(card(item)));
      offset+=data.length;
      if(data.length<pageSize){
        done=true;
        status.textContent=offset===0?'Nothing here...':'No more images';
      }else{
        status.style.display='none';
      }
    }catch(e){
      console.error(e);
      if(mine===gen)status.textContent='Could not load images.';
    }finally{
      if(mine===gen)loading=false;
    }
  }

  input.addEventListener('change',()=>{
    q=input.value.trim();
    const url=q?'/?q='+encodeURIComponent(q):'/';
    history.replaceState(null,'',url);
    load(true);
  });
  window.addEventListener('scroll',()=>{
    if(window.innerHeight+window.scrollY>=document.body.offsetHeight-1000)load(false);
  });
  load(true);
})();
"#;

/// Render the home page.
pub fn render(site_name: &str) -> Markup {
    let body = html! {
        (header(site_name, html! {
            div class="search-bar" {
                input type="search" id="search" placeholder="Search tags or captions..." autocomplete="off";
            }
        }))
        div class="gallery" id="g" data-page-size=(PAGE_SIZE) data-r18-tag=(R18_TAG) {}
        div id="status" class="status" { "Loading..." }
        script { (PreEscaped(GALLERY_JS)) }
    };

    page_shell(
        site_name,
        "Browse and search the image gallery.",
        site_name,
        None,
        body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_carries_page_size_for_the_client() {
        let page = render("Gallery").into_string();
        assert!(page.contains(&format!("data-page-size=\"{PAGE_SIZE}\"")));
        assert!(page.contains("data-r18-tag=\"R-18\""));
        assert!(page.contains("id=\"search\""));
        assert!(page.contains("/api/posts?q="));
    }

    #[test]
    fn home_script_builds_cards_without_inner_html() {
        assert!(!GALLERY_JS.contains("innerHTML"));
        assert!(GALLERY_JS.contains("textContent"));
        assert!(GALLERY_JS.contains("res.ok"));
    }

    #[test]
    fn new_search_is_not_blocked_by_a_page_in_flight() {
        let load = GALLERY_JS
            .split("async function load(reset){")
            .nth(1)
            .unwrap();
        let reset = load.find("if(reset)").unwrap();
        let busy = load.find("if(loading").unwrap();
        assert!(reset < busy);
        assert!(load.contains("if(mine!==gen)return;"));
    }

    #[test]
    fn site_name_is_escaped() {
        let page = render("<Gallery>").into_string();
        assert!(page.contains("&lt;Gallery&gt;"));
    }
}
