//! Plugin-repository descriptors.
//!
//! One repository/channel pair renders into either shape:
//!
//! - [`Shape::Rich`]: a full `plugin-repository` document with a single
//!   `idea-plugin` entry, as served to the IDE's custom plugin repository
//!   browser.
//! - [`Shape::Minimal`]: a `plugins` list holding one `plugin` with only
//!   `id`, `url` and `version`, enough for update checks.
//!
//! Both shapes encode to JSON or XML with the same field names. In XML,
//! scalar metadata of an element is written as attributes.

use std::str::FromStr;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};

use crate::error::CatalogError;
use crate::model::{Catalog, Channel, Repository, Vendor, Version};

const CATEGORY: &str = "Custom Languages";
const SINCE_BUILD: &str = "122.0";
const UNBOUNDED: &str = "n/a";

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Xml,
}

impl Format {
    /// `"xml"` selects XML; every other extension falls back to JSON.
    pub fn from_extension(ext: &str) -> Self {
        if ext == "xml" { Format::Xml } else { Format::Json }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Xml => "application/xml",
        }
    }
}

/// Descriptor layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Shape {
    #[default]
    Rich,
    Minimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginRepository {
    pub ff: String,
    pub category: PluginCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginCategory {
    pub name: String,
    #[serde(rename = "idea-plugin")]
    pub idea_plugin: IdeaPlugin,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct IdeaPlugin {
    pub downloads: u64,
    pub size: u64,
    pub date: i64,
    /// Project home page.
    pub url: String,
    pub name: String,
    pub id: String,
    pub description: String,
    pub version: String,
    pub vendor: Vendor,
    pub idea_version: IdeaVersion,
    pub change_notes: String,
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
    pub rating: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct IdeaVersion {
    pub min: String,
    pub max: String,
    pub since_build: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginList {
    pub plugin: PluginEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginEntry {
    pub id: String,
    /// Download location of the resolved release.
    pub url: String,
    pub version: String,
}

/// A resolved descriptor in one of the two shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    Rich(PluginRepository),
    Minimal(PluginList),
}

impl Descriptor {
    /// Build the descriptor for `channel` of `repository` owned by `owner`.
    /// An unresolved channel yields empty strings and zeros.
    pub fn build(owner: &str, repository: &Repository, channel: Channel, shape: Shape) -> Self {
        let empty = Version::default();
        let version = repository.versions.get(channel).unwrap_or(&empty);
        let id = format!("{}.{}", repository.id, channel);

        match shape {
            Shape::Rich => Descriptor::Rich(PluginRepository {
                ff: format!("\"{CATEGORY}\""),
                category: PluginCategory {
                    name: CATEGORY.to_owned(),
                    idea_plugin: IdeaPlugin {
                        downloads: version.download_count,
                        size: version.size,
                        date: version.date,
                        url: format!("https://github.com/{owner}/{}", repository.name),
                        name: repository.plugin_name.clone(),
                        id,
                        description: repository.description.clone(),
                        version: version.name.clone(),
                        vendor: repository.vendor.clone(),
                        idea_version: IdeaVersion {
                            min: UNBOUNDED.to_owned(),
                            max: UNBOUNDED.to_owned(),
                            since_build: SINCE_BUILD.to_owned(),
                        },
                        change_notes: version.body.clone(),
                        download_url: version.url.clone(),
                        rating: 0.0,
                    },
                },
            }),
            Shape::Minimal => Descriptor::Minimal(PluginList {
                plugin: PluginEntry {
                    id,
                    url: version.url.clone(),
                    version: version.name.clone(),
                },
            }),
        }
    }

    pub fn encode(&self, format: Format) -> Result<Vec<u8>, CatalogError> {
        match format {
            Format::Json => self.to_json(),
            Format::Xml => self.to_xml(),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, CatalogError> {
        let bytes = match self {
            Descriptor::Rich(d) => serde_json::to_vec_pretty(d)?,
            Descriptor::Minimal(d) => serde_json::to_vec_pretty(d)?,
        };
        Ok(bytes)
    }

    pub fn to_xml(&self) -> Result<Vec<u8>, CatalogError> {
        let mut w = Writer::new_with_indent(Vec::new(), b' ', 4);
        match self {
            Descriptor::Rich(d) => {
                w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
                write_plugin_repository(&mut w, d)?;
            }
            Descriptor::Minimal(d) => write_plugin_list(&mut w, d)?,
        }
        Ok(w.into_inner())
    }
}

/// Render the descriptor for `owner/repo` on `channel`.
///
/// Returns [`CatalogError::NotFound`] for an unknown organization,
/// repository or channel literal.
pub fn render(
    catalog: &Catalog,
    owner: &str,
    repo: &str,
    channel: &str,
    format: Format,
    shape: Shape,
) -> Result<Vec<u8>, CatalogError> {
    let repository = catalog
        .find_repository(owner, repo)
        .ok_or_else(|| CatalogError::NotFound(format!("repository {owner}/{repo}")))?;
    let channel = Channel::from_str(channel)
        .map_err(|_| CatalogError::NotFound(format!("channel '{channel}'")))?;

    Descriptor::build(owner, repository, channel, shape).encode(format)
}

type XmlWriter = Writer<Vec<u8>>;

fn write_plugin_repository(w: &mut XmlWriter, d: &PluginRepository) -> Result<(), CatalogError> {
    w.write_event(Event::Start(BytesStart::new("plugin-repository")))?;
    text_element(w, "ff", &d.ff)?;

    let category = BytesStart::new("category").with_attributes([("name", d.category.name.as_str())]);
    w.write_event(Event::Start(category))?;
    write_idea_plugin(w, &d.category.idea_plugin)?;
    w.write_event(Event::End(BytesEnd::new("category")))?;

    w.write_event(Event::End(BytesEnd::new("plugin-repository")))?;
    Ok(())
}

fn write_idea_plugin(w: &mut XmlWriter, p: &IdeaPlugin) -> Result<(), CatalogError> {
    let downloads = p.downloads.to_string();
    let size = p.size.to_string();
    let date = p.date.to_string();
    let start = BytesStart::new("idea-plugin").with_attributes([
        ("downloads", downloads.as_str()),
        ("size", size.as_str()),
        ("date", date.as_str()),
        ("url", p.url.as_str()),
    ]);
    w.write_event(Event::Start(start))?;

    text_element(w, "name", &p.name)?;
    text_element(w, "id", &p.id)?;
    text_element(w, "description", &p.description)?;
    text_element(w, "version", &p.version)?;

    let vendor = BytesStart::new("vendor")
        .with_attributes([("email", p.vendor.email.as_str()), ("url", p.vendor.url.as_str())]);
    w.write_event(Event::Start(vendor))?;
    w.write_event(Event::Text(BytesText::new(&p.vendor.name)))?;
    w.write_event(Event::End(BytesEnd::new("vendor")))?;

    let idea_version = BytesStart::new("idea-version").with_attributes([
        ("min", p.idea_version.min.as_str()),
        ("max", p.idea_version.max.as_str()),
        ("since-build", p.idea_version.since_build.as_str()),
    ]);
    w.write_event(Event::Empty(idea_version))?;

    text_element(w, "change-notes", &p.change_notes)?;
    text_element(w, "downloadUrl", &p.download_url)?;
    text_element(w, "rating", &p.rating.to_string())?;

    w.write_event(Event::End(BytesEnd::new("idea-plugin")))?;
    Ok(())
}

fn write_plugin_list(w: &mut XmlWriter, d: &PluginList) -> Result<(), CatalogError> {
    w.write_event(Event::Start(BytesStart::new("plugins")))?;
    let plugin = BytesStart::new("plugin").with_attributes([
        ("id", d.plugin.id.as_str()),
        ("url", d.plugin.url.as_str()),
        ("version", d.plugin.version.as_str()),
    ]);
    w.write_event(Event::Empty(plugin))?;
    w.write_event(Event::End(BytesEnd::new("plugins")))?;
    Ok(())
}

fn text_element(w: &mut XmlWriter, name: &str, text: &str) -> Result<(), CatalogError> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
