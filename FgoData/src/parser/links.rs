//! Servant list (サーヴァント一覧) parsing

use super::html::{attribute, open_tag, section_after, tag_blocks, text_content};
use crate::error::{Error, Result};
use crate::model::{ServantClass, ServantLink, UNPLAYABLE_SERVANT_IDS};

pub const SERVANT_LIST_SECTION: &str = "サーヴァント一覧";

/// Collect servant links from the wiki's servant list page.
///
/// Rows are `id | rarity | name (link) | class code | ...`. Header rows and
/// unplayable servants are skipped; the result is sorted by id.
pub fn parse_servant_links(html: &str) -> Result<Vec<ServantLink>> {
    let Some(section) = section_after(html, "h2", SERVANT_LIST_SECTION) else {
        tracing::warn!("Servant list heading not found");
        return Ok(Vec::new());
    };

    let mut links = Vec::new();
    for table in tag_blocks(section, "table") {
        for row in tag_blocks(table, "tr") {
            if let Some(link) = parse_row(row)? {
                links.push(link);
            }
        }
    }
    links.sort_by_key(|link| link.id);
    tracing::info!("{} servant links", links.len());
    Ok(links)
}

fn parse_row(row: &str) -> Result<Option<ServantLink>> {
    let cells = tag_blocks(row, "td");
    if cells.len() < 4 {
        return Ok(None);
    }

    let Ok(id) = text_content(cells[0]).parse() else {
        tracing::debug!("skip row without id: {}", text_content(cells[0]));
        return Ok(None);
    };
    if UNPLAYABLE_SERVANT_IDS.contains(&id) {
        tracing::debug!("skip unplayable servant {:03}", id);
        return Ok(None);
    }

    let Ok(rarity) = text_content(cells[1]).parse() else {
        tracing::warn!("servant {:03}: invalid rarity \"{}\"", id, text_content(cells[1]));
        return Ok(None);
    };
    let Some(anchor) = tag_blocks(cells[2], "a").into_iter().next() else {
        tracing::warn!("servant {:03}: no page link", id);
        return Ok(None);
    };
    let name = text_content(anchor);
    let href = attribute(open_tag(anchor), "href").unwrap_or_default();
    let code = text_content(cells[3]);
    let klass = ServantClass::from_code(&code).ok_or(Error::UnknownClass(code))?;

    let link = ServantLink {
        id,
        name,
        klass,
        rarity,
        url: absolute_url(&href),
    };
    tracing::debug!(
        "link to {:03}: {} (rarity:{}, class:{}, url:\"{}\")",
        link.id,
        link.name,
        link.rarity,
        link.klass,
        link.url
    );
    Ok(Some(link))
}

/// Protocol-relative hrefs (`//host/path`) become `https:` URLs
fn absolute_url(href: &str) -> String {
    if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LIST: &str = r#"<div id="wikibody">
<h2>サーヴァント一覧</h2>
<div><table><tbody>
<tr><th>No</th><th>★</th><th>名前</th><th>クラス</th></tr>
<tr><td>3</td><td>4</td><td><a href="//w.atwiki.jp/f_go/pages/3.html">アルトリア・ペンドラゴン〔オルタ〕</a></td><td> 剣 </td></tr>
<tr><td>2</td><td>5</td><td><b><a href="//w.atwiki.jp/f_go/pages/2.html">アルトリア・ペンドラゴン</a></b></td><td>剣</td></tr>
<tr><td>83</td><td>0</td><td><a href="//w.atwiki.jp/f_go/pages/83.html">ソロモン</a></td><td>術</td></tr>
<tr><td>23</td><td>1</td><td><a href="https://w.atwiki.jp/f_go/pages/23.html">呪腕のハサン</a></td><td>殺</td></tr>
</tbody></table></div>
<h2>関連ページ</h2>
<table><tr><td>999</td><td>5</td><td><a href="/x">x</a></td><td>剣</td></tr></table>
</div>"#;

    #[test]
    fn test_parse_servant_links() {
        let links = parse_servant_links(LIST).unwrap();
        let ids: Vec<u32> = links.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 3, 23]);
        assert_eq!(
            links[0],
            ServantLink {
                id: 2,
                name: "アルトリア・ペンドラゴン".to_string(),
                klass: ServantClass::Saber,
                rarity: 5,
                url: "https://w.atwiki.jp/f_go/pages/2.html".to_string(),
            }
        );
        assert_eq!(links[2].klass, ServantClass::Assassin);
        assert_eq!(links[2].url, "https://w.atwiki.jp/f_go/pages/23.html");
    }

    #[test]
    fn test_unknown_class_is_an_error() {
        let html = r#"<h2>サーヴァント一覧</h2><table><tr><td>1</td><td>3</td><td><a href="//a">A</a></td><td>砲</td></tr></table>"#;
        assert!(matches!(parse_servant_links(html), Err(Error::UnknownClass(code)) if code == "砲"));
    }

    #[test]
    fn test_missing_heading() {
        assert!(parse_servant_links("<h2>other</h2>").unwrap().is_empty());
    }
}
