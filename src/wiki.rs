//! Wiki artifacts generated from the resolved keys and the compact region data.
//!
//! Each [`DocumentKind`] pairs a template file with the wiki page it is published
//! under and the placeholders it needs. The free functions below build the large,
//! aggregated replacement strings (Lua tables, wikitext table rows).

use crate::config::{Config, page_file_stem};
use crate::error::Result;
use crate::format::{lua_literal, lua_string};
use crate::keys::ResolvedKeys;
use crate::models::{CompactRegionData, KeyMap, Value};
use crate::template::{Placeholders, TemplateStore};

/// Shown in the dispatcher docs when every base name equals its full key.
pub const NO_ALIASES_ROW: &str = "|-\n| ''(Geen aliassen gedefinieerd)'' \n|| -";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Per-year Lua module holding metadata and region data.
    DataModule,
    DataModuleDoc,
    /// Main module resolving aliases and loading the per-year submodule.
    Dispatcher,
    DispatcherDoc,
    /// Template returning a single statistic for a region.
    StatTemplate,
    StatTemplateDoc,
    InfoTemplate,
    InfoTemplateDoc,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 8] = [
        DocumentKind::DataModule,
        DocumentKind::DataModuleDoc,
        DocumentKind::Dispatcher,
        DocumentKind::DispatcherDoc,
        DocumentKind::StatTemplate,
        DocumentKind::StatTemplateDoc,
        DocumentKind::InfoTemplate,
        DocumentKind::InfoTemplateDoc,
    ];

    pub fn template_file(self) -> &'static str {
        match self {
            DocumentKind::DataModule => "module_data.lua",
            DocumentKind::DataModuleDoc => "module_data_doc.wikitext",
            DocumentKind::Dispatcher => "module_dispatcher.lua",
            DocumentKind::DispatcherDoc => "module_dispatcher_doc.wikitext",
            DocumentKind::StatTemplate => "template_stat.wikitext",
            DocumentKind::StatTemplateDoc => "template_stat_doc.wikitext",
            DocumentKind::InfoTemplate => "template_info.wikitext",
            DocumentKind::InfoTemplateDoc => "template_info_doc.wikitext",
        }
    }
}

/// A rendered artifact, ready to be written and uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub kind: DocumentKind,
    /// Target wiki page.
    pub page: String,
    pub file_name: String,
    pub content: String,
}

/// One line per required statistic, sorted by full key.
pub fn metadata_entries(keys: &ResolvedKeys) -> String {
    let required = keys.required_full_keys();
    keys.metadata
        .iter()
        .filter(|(full_key, _)| required.contains(*full_key))
        .map(|(full_key, meta)| {
            format!(
                "  [{}] = {{ title = {}, unit = {}, decimals = {}, description = {} }},",
                lua_string(full_key),
                lua_literal(&Value::from(meta.title.clone())),
                lua_literal(&Value::from(meta.unit.clone())),
                lua_literal(&Value::from(meta.decimals)),
                lua_literal(&Value::from(meta.description.clone())),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One Lua table per region, regions and statistics in key order.
pub fn data_entries(data: &CompactRegionData) -> String {
    data.iter()
        .map(|(region, stats)| {
            let mut block = format!("  [{}] = {{\n", lua_string(region));
            for (key, value) in stats {
                block.push_str(&format!("    [{}] = {},\n", lua_string(key), lua_literal(value)));
            }
            block.push_str("  },");
            block
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lua `if` chain translating aliases to full keys, in resolution order.
pub fn alias_mapping_block(key_map: &KeyMap) -> String {
    key_map
        .iter()
        .filter(|(base, full)| base != full)
        .map(|(base, full)| {
            format!("    if stat_alias == '{base}' then internal_stat_key = '{full}' end")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wikitext rows `alias || full key`, sorted by alias.
pub fn alias_table_rows(key_map: &KeyMap) -> String {
    let mut bases: Vec<&String> = key_map.keys().collect();
    bases.sort();
    let rows: Vec<String> = bases
        .into_iter()
        .filter_map(|base| {
            let full = &key_map[base.as_str()];
            (base != full).then(|| format!("|-\n| <code>{base}</code> \n|| <code>{full}</code>"))
        })
        .collect();
    if rows.is_empty() {
        NO_ALIASES_ROW.to_string()
    } else {
        rows.join("\n")
    }
}

/// Wikitext rows describing every user-facing statistic.
pub fn available_stats_table(keys: &ResolvedKeys) -> String {
    let mut bases: Vec<&String> = keys.key_map.keys().collect();
    bases.sort();
    bases
        .into_iter()
        .map(|base| {
            let full = &keys.key_map[base.as_str()];
            let meta = keys.metadata.get(full);
            let title = meta.and_then(|m| m.title.as_deref()).unwrap_or("N/A");
            let unit = match meta.and_then(|m| m.unit.as_deref()) {
                Some(u) if !u.is_empty() => format!(" ({u})"),
                _ => String::new(),
            };
            let details = if base != full {
                format!("CBS: <code>{full}</code>")
            } else {
                String::new()
            };
            format!("|-\n| <code>{base}</code> \n|| {title}{unit} \n|| {details}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders every [`DocumentKind`] for one dataset year.
#[derive(Debug)]
pub struct Generator<'a> {
    pub config: &'a Config,
    pub keys: &'a ResolvedKeys,
    pub data: &'a CompactRegionData,
    pub year: i32,
    /// Inserted verbatim; callers pass an RFC 3339 UTC timestamp.
    pub generated_at: String,
}

impl<'a> Generator<'a> {
    fn region_types(&self) -> String {
        self.config
            .region_types
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn stats_list_full(&self) -> String {
        self.keys
            .required_full_keys()
            .into_iter()
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn stats_list_user(&self) -> String {
        let mut bases: Vec<&str> = self.keys.key_map.keys().map(String::as_str).collect();
        bases.sort();
        bases.join(", ")
    }

    pub fn page(&self, kind: DocumentKind) -> String {
        let wiki = &self.config.wiki;
        match kind {
            DocumentKind::DataModule => wiki.data_submodule(self.year),
            DocumentKind::DataModuleDoc => format!("{}/doc", wiki.data_submodule(self.year)),
            DocumentKind::Dispatcher => wiki.dispatcher_module.clone(),
            DocumentKind::DispatcherDoc => format!("{}/doc", wiki.dispatcher_module),
            DocumentKind::StatTemplate => wiki.stat_template.clone(),
            DocumentKind::StatTemplateDoc => format!("{}/doc", wiki.stat_template),
            DocumentKind::InfoTemplate => wiki.info_template.clone(),
            DocumentKind::InfoTemplateDoc => format!("{}/doc", wiki.info_template),
        }
    }

    pub fn file_name(&self, kind: DocumentKind) -> String {
        let wiki = &self.config.wiki;
        let dispatcher = page_file_stem(&wiki.dispatcher_module);
        let stat = page_file_stem(&wiki.stat_template);
        let info = page_file_stem(&wiki.info_template);
        match kind {
            DocumentKind::DataModule => format!("{dispatcher}_{}.lua", self.year),
            DocumentKind::DataModuleDoc => format!("{dispatcher}_{}_doc.wikitext", self.year),
            DocumentKind::Dispatcher => format!("{dispatcher}_DISPATCHER_MANUAL_COPY.lua"),
            DocumentKind::DispatcherDoc => format!("{dispatcher}_doc.wikitext"),
            DocumentKind::StatTemplate => format!("{stat}.wikitext"),
            DocumentKind::StatTemplateDoc => format!("{stat}_doc.wikitext"),
            DocumentKind::InfoTemplate => format!("{info}.wikitext"),
            DocumentKind::InfoTemplateDoc => format!("{info}_doc.wikitext"),
        }
    }

    pub fn placeholders(&self, kind: DocumentKind) -> Placeholders {
        let wiki = &self.config.wiki;
        let data_submodule = wiki.data_submodule(self.year);
        let mut p = Placeholders::new();
        match kind {
            DocumentKind::DataModule => {
                p.set("YEAR", self.year)
                    .set("DATASET_ID", &self.config.dataset_id)
                    .set("GENERATION_TIMESTAMP", &self.generated_at)
                    .set("REGION_TYPES", self.region_types())
                    .set("STATS_LIST_FULL", self.stats_list_full())
                    .set("METADATA_ENTRIES", metadata_entries(self.keys))
                    .set("DATA_ENTRIES", data_entries(self.data));
            }
            DocumentKind::DataModuleDoc => {
                p.set("YEAR", self.year)
                    .set("DATASET_ID", &self.config.dataset_id)
                    .set("GENERATION_TIMESTAMP", &self.generated_at)
                    .set("REGION_ID_KEY", &self.config.identifier_key)
                    .set("STATS_LIST_FULL", self.stats_list_full())
                    .set("REGION_TYPES", self.region_types())
                    .set("LUA_DISPATCHER_PATH", &wiki.dispatcher_module)
                    .set("TEMPLATE_STAT_PATH", &wiki.stat_template)
                    .set("TEMPLATE_STAT_NAME", wiki.stat_template_name());
            }
            DocumentKind::Dispatcher => {
                p.set("MODULE_BASE_NAME", wiki.dispatcher_base_name())
                    .set("ALIAS_MAPPING_BLOCK", alias_mapping_block(&self.keys.key_map));
            }
            DocumentKind::DispatcherDoc => {
                p.set("TEMPLATE_STAT_PATH", &wiki.stat_template)
                    .set("TEMPLATE_STAT_NAME", wiki.stat_template_name())
                    .set("LUA_DISPATCHER_PATH", &wiki.dispatcher_module)
                    .set("LUA_DATA_SUBMODULE_EXAMPLE_PATH", &data_submodule)
                    .set("EXAMPLE_YEAR", self.year)
                    .set("ALIAS_TABLE_ROWS", alias_table_rows(&self.keys.key_map))
                    .set("DATASET_ID", &self.config.dataset_id);
            }
            DocumentKind::StatTemplate => {
                p.set("MODULE_INVOKE_PATH", wiki.dispatcher_base_name())
                    .set("YEAR", self.year);
            }
            DocumentKind::StatTemplateDoc => {
                p.set("TEMPLATE_STAT_NAME", wiki.stat_template_name())
                    .set("YEAR", self.year)
                    .set("REGION_ID_KEY", &self.config.identifier_key)
                    .set("STATS_LIST_USER", self.stats_list_user())
                    .set("REGION_TYPES", self.region_types())
                    .set("AVAILABLE_STATS_TABLE", available_stats_table(self.keys))
                    .set("LUA_DISPATCHER_PATH", &wiki.dispatcher_module)
                    .set("LUA_DATA_SUBMODULE_PATH", &data_submodule)
                    .set("DATASET_ID", &self.config.dataset_id);
            }
            DocumentKind::InfoTemplate => {
                p.set("TEMPLATE_STAT_PATH", &wiki.stat_template)
                    .set("TEMPLATE_STAT_NAME", wiki.stat_template_name());
            }
            DocumentKind::InfoTemplateDoc => {
                p.set("TEMPLATE_STAT_PATH", &wiki.stat_template)
                    .set("TEMPLATE_STAT_NAME", wiki.stat_template_name())
                    .set("YEAR", self.year)
                    .set("LUA_DISPATCHER_PATH", &wiki.dispatcher_module)
                    .set("LUA_DATA_SUBMODULE_PATH", &data_submodule)
                    .set("STATS_LIST_USER", self.stats_list_user())
                    .set("REGION_TYPES", self.region_types())
                    .set("DATASET_ID", &self.config.dataset_id);
            }
        }
        p
    }

    pub fn render(&self, kind: DocumentKind, templates: &TemplateStore) -> Result<Document> {
        let content = templates.apply(kind.template_file(), &self.placeholders(kind))?;
        Ok(Document {
            kind,
            page: self.page(kind),
            file_name: self.file_name(kind),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_block_skips_identity_mappings_and_keeps_order() {
        let mut km = KeyMap::new();
        km.insert("Vrouwen".into(), "Vrouwen_7".into());
        km.insert("Bevolkingsdichtheid".into(), "Bevolkingsdichtheid".into());
        km.insert("Mannen".into(), "Mannen_6".into());
        assert_eq!(
            alias_mapping_block(&km),
            "    if stat_alias == 'Vrouwen' then internal_stat_key = 'Vrouwen_7' end\n    if stat_alias == 'Mannen' then internal_stat_key = 'Mannen_6' end"
        );
    }

    #[test]
    fn alias_rows_fall_back_when_nothing_is_aliased() {
        let mut km = KeyMap::new();
        km.insert("Bevolkingsdichtheid".into(), "Bevolkingsdichtheid".into());
        assert_eq!(alias_table_rows(&km), NO_ALIASES_ROW);
    }

    #[test]
    fn every_kind_has_a_distinct_file_name() {
        let config = Config::default();
        let keys = ResolvedKeys::default();
        let data = CompactRegionData::new();
        let g = Generator {
            config: &config,
            keys: &keys,
            data: &data,
            year: 2023,
            generated_at: String::new(),
        };
        let mut names: Vec<String> = DocumentKind::ALL.iter().map(|k| g.file_name(*k)).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), DocumentKind::ALL.len());
        assert_eq!(
            g.file_name(DocumentKind::DataModule),
            "Module_CBS_Kerncijfers_Wijken_en_Buurten_Data_2023.lua"
        );
        assert_eq!(
            g.page(DocumentKind::DataModuleDoc),
            "Module:CBS_Kerncijfers_Wijken_en_Buurten_Data/2023/doc"
        );
    }
}
