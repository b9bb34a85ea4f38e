//! Servant page regions and record assembly
//!
//! A servant page has one `<h3>` per topic. Skills are `<h4>` headings under
//! 保有スキル / アペンドスキル, each followed by a table whose `rowspan` cell
//! holds the icon. Upgrade costs are the cells of the first table under
//! 霊基再臨 / スキル強化 / アペンドスキル強化.

use super::html::{
    attribute, next_tag_block, normalize_space, open_tag, section_after, tag_blocks, text_content,
    to_lower,
};
use super::level::{parse_ascension_resources, parse_skill_resources};
use super::skill::parse_skill_slots;
use crate::error::Result;
use crate::model::{
    Costume, LeveledResourceList, Servant, ServantLink, ServantName, SkillCategory, SkillSlots,
};

pub const ACTIVE_SKILL_SECTION: &str = "保有スキル";
pub const APPEND_SKILL_SECTION: &str = "アペンドスキル";
pub const ASCENSION_SECTION: &str = "霊基再臨";
pub const SKILL_UPGRADE_SECTION: &str = "スキル強化";
pub const APPEND_SKILL_UPGRADE_SECTION: &str = "アペンドスキル強化";

const SECTION_TAG: &str = "h3";
const SKILL_TAG: &str = "h4";

/// A fetched servant page, narrowed to the wiki body when present
#[derive(Debug, Clone, Copy)]
pub struct ServantPage<'a> {
    body: &'a str,
}

impl<'a> ServantPage<'a> {
    pub fn new(html: &'a str) -> Self {
        Self {
            body: wiki_body(html).unwrap_or(html),
        }
    }

    /// `(heading, icon cell)` text pairs under a skill section
    pub fn skill_entries(&self, section: &str) -> Vec<(String, String)> {
        let Some(section) = section_after(self.body, SECTION_TAG, section) else {
            tracing::debug!("Section not found: {}", section);
            return Vec::new();
        };

        let mut entries = Vec::new();
        let mut pos = 0;
        while let Some((start, end)) = next_tag_block(section, SKILL_TAG, pos) {
            let region_end =
                next_tag_block(section, SKILL_TAG, end).map_or(section.len(), |(next, _)| next);
            let heading = normalize_space(&text_content(&section[start..end]));
            let icon = icon_cell(&section[end..region_end]).unwrap_or_default();
            entries.push((heading, icon));
            pos = end;
        }
        entries
    }

    /// Text of every `<td>` in the first table under `section`
    pub fn table_cells(&self, section: &str) -> Vec<String> {
        let Some(section) = section_after(self.body, SECTION_TAG, section) else {
            tracing::debug!("Section not found: {}", section);
            return Vec::new();
        };
        let Some(table) = tag_blocks(section, "table").into_iter().next() else {
            tracing::debug!("No table in section");
            return Vec::new();
        };
        tag_blocks(table, "td").into_iter().map(text_content).collect()
    }

    pub fn skills(&self) -> SkillSlots {
        parse_skill_slots(
            self.skill_entries(ACTIVE_SKILL_SECTION),
            SkillCategory::Active.default_slots(),
        )
    }

    pub fn append_skills(&self) -> SkillSlots {
        parse_skill_slots(
            self.skill_entries(APPEND_SKILL_SECTION),
            SkillCategory::Append.default_slots(),
        )
    }

    pub fn ascension_resources(&self) -> Result<LeveledResourceList> {
        parse_ascension_resources(self.table_cells(ASCENSION_SECTION))
    }

    pub fn skill_resources(&self) -> Result<LeveledResourceList> {
        parse_skill_resources(self.table_cells(SKILL_UPGRADE_SECTION))
    }

    pub fn append_skill_resources(&self) -> Result<LeveledResourceList> {
        parse_skill_resources(self.table_cells(APPEND_SKILL_UPGRADE_SECTION))
    }
}

/// The `<div id="wikibody">` block of a page
fn wiki_body(html: &str) -> Option<&str> {
    let lc = to_lower(html);
    let marker = lc.find("id=\"wikibody\"")?;
    let div_start = lc[..marker].rfind("<div")?;
    next_tag_block(html, "div", div_start).map(|(start, end)| &html[start..end])
}

/// Text of the first `rowspan` cell in a region
fn icon_cell(region: &str) -> Option<String> {
    tag_blocks(region, "td")
        .into_iter()
        .find(|td| attribute(open_tag(td), "rowspan").is_some())
        .map(text_content)
}

/// Assemble one servant record from its page and curated side data.
///
/// Name overrides win over the link's name. Costumes are sorted by id.
pub fn parse_servant_page(
    html: &str,
    link: &ServantLink,
    name: Option<&ServantName>,
    costumes: &[Costume],
) -> Result<Servant> {
    let page = ServantPage::new(html);

    tracing::debug!("skills");
    let skills = page.skills();
    tracing::debug!("append skills");
    let append_skills = page.append_skills();
    tracing::debug!("ascension resources");
    let ascension_resources = page.ascension_resources()?;
    tracing::debug!("skill resources");
    let skill_resources = page.skill_resources()?;
    tracing::debug!("append skill resources");
    let append_skill_resources = page.append_skill_resources()?;

    let mut costumes = costumes.to_vec();
    costumes.sort_by_key(|costume| costume.id);

    Ok(Servant {
        id: link.id,
        name: name
            .and_then(|n| n.name.clone())
            .unwrap_or_else(|| link.name.clone()),
        false_name: name.and_then(|n| n.false_name.clone()),
        ascension_names: name.and_then(|n| n.ascension_names.clone()),
        klass: link.klass,
        rarity: link.rarity,
        skills,
        append_skills,
        costumes,
        ascension_resources,
        skill_resources,
        append_skill_resources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemQuantity, ServantClass};
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<html><body><div id="menu"><h3>保有スキル</h3></div>
<div id="wikibody">
<h3>保有スキル</h3>
<h4>Skill1：魔力放出 A</h4>
<div><table><tr><td rowspan="2">301,A</td><td>効果</td></tr></table></div>
<h4>Skill1[強化後]：魔力放出 A+</h4>
<div><table><tr><td rowspan="2">302</td><td>効果</td></tr></table></div>
<h4>Skill2：直感 B</h4>
<div><table><tr><td>no icon</td></tr></table></div>
<h3>アペンドスキル</h3>
<div><h4>Skill1：追撃技巧向上</h4>
<table><tr><td rowspan=1>600</td></tr></table></div>
<h3>霊基再臨</h3>
<div><div><table><tbody>
<tr><th>段階</th><th>素材</th></tr>
<tr><td>1段階</td><td>セイバーピース,x4<br>QP,x5万</td></tr>
<tr><td>2段階</td><td>セイバーピース,x10</td><td>QP,x15万</td></tr>
</tbody></table><table><tr><td>3段階</td></tr></table></div></div>
<h3>スキル強化</h3>
<div><div><table><tbody>
<tr><td>Lv1→Lv2</td><td>剣の輝石,x4</td><td>QP,x10万</td></tr>
</tbody></table></div></div>
</div></body></html>"#;

    fn link() -> ServantLink {
        ServantLink {
            id: 2,
            name: "アルトリア・ペンドラゴン".to_string(),
            klass: ServantClass::Saber,
            rarity: 5,
            url: "https://w.atwiki.jp/f_go/pages/2.html".to_string(),
        }
    }

    #[test]
    fn test_skill_entries_pair_heading_with_icon() {
        let page = ServantPage::new(PAGE);
        let entries = page.skill_entries(ACTIVE_SKILL_SECTION);
        assert_eq!(
            entries,
            vec![
                ("Skill1：魔力放出 A".to_string(), "301,A".to_string()),
                ("Skill1[強化後]：魔力放出 A+".to_string(), "302".to_string()),
                ("Skill2：直感 B".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_first_table_only() {
        let page = ServantPage::new(PAGE);
        let levels = page.ascension_resources().unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].currency, 50_000);
        assert_eq!(levels[0].items, vec![ItemQuantity::new("セイバーピース", 4)]);
        assert_eq!(levels[1].currency, 150_000);
    }

    #[test]
    fn test_missing_section_is_empty() {
        let page = ServantPage::new(PAGE);
        assert!(page.append_skill_resources().unwrap().is_empty());
        assert!(page.table_cells("宝具").is_empty());
    }

    #[test]
    fn test_parse_servant_page() {
        let name = ServantName {
            id: 2,
            name: Some("アルトリア".to_string()),
            false_name: None,
            ascension_names: None,
        };
        let costumes = vec![
            Costume {
                id: 12,
                name: "B".to_string(),
                resource: Default::default(),
            },
            Costume {
                id: 3,
                name: "A".to_string(),
                resource: Default::default(),
            },
        ];
        let servant = parse_servant_page(PAGE, &link(), Some(&name), &costumes).unwrap();

        assert_eq!(servant.name, "アルトリア");
        assert_eq!(servant.klass, ServantClass::Saber);
        assert_eq!(servant.skills.len(), 3);
        assert_eq!(servant.skills.slot(1).unwrap().len(), 2);
        assert_eq!(servant.skills.slot(1).unwrap()[1].rank, "A+");
        assert_eq!(servant.skills.slot(2).unwrap()[0].icon, 0);
        assert_eq!(servant.append_skills.len(), 5);
        assert_eq!(servant.append_skills.slot(1).unwrap()[0].icon, 600);
        assert_eq!(servant.skill_resources.len(), 1);
        assert_eq!(servant.skill_resources[0].currency, 100_000);
        let ids: Vec<u32> = servant.costumes.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 12]);
    }

    #[test]
    fn test_link_name_used_without_override() {
        let servant = parse_servant_page(PAGE, &link(), None, &[]).unwrap();
        assert_eq!(servant.name, "アルトリア・ペンドラゴン");
        assert_eq!(servant.false_name, None);
    }
}
