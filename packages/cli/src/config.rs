use liquify_common::{
    CommandSpec, CommandToolchain, ComponentRenderer, FileSystem, Formatter, IdentityFormatter,
    IdentityTranspiler, RealFileSystem, StyleCompiler, Transpiler, UnconfiguredRenderer,
};
use liquify_compiler_css::SassCompiler;
use liquify_section::Toolchains;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "liquify.config.json";

/// Liquify configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding section templates
    #[serde(default = "default_sections_dir")]
    pub sections_dir: String,

    /// Directory holding snippet templates
    #[serde(default = "default_snippets_dir")]
    pub snippets_dir: String,

    /// Theme root; sections land in `<outDir>/sections`, snippets in
    /// `<outDir>/snippets`
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Salt mixed into every placeholder token
    #[serde(default)]
    pub salt: String,

    #[serde(default)]
    pub toolchains: ToolchainConfig,
}

fn default_sections_dir() -> String {
    "src/sections".to_string()
}

fn default_snippets_dir() -> String {
    "src/snippets".to_string()
}

fn default_out_dir() -> String {
    ".".to_string()
}

/// External commands; anything left out falls back to a built-in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolchainConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CommandSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transpile: Option<CommandSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render: Option<CommandSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<CommandSpec>,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn sections_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.sections_dir)
    }

    pub fn snippets_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.snippets_dir)
    }

    pub fn out_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.out_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sections_dir: default_sections_dir(),
            snippets_dir: default_snippets_dir(),
            out_dir: default_out_dir(),
            salt: String::new(),
            toolchains: ToolchainConfig::default(),
        }
    }
}

/// Owned collaborators built from a [`ToolchainConfig`]
pub struct Toolset {
    formatter: Box<dyn Formatter>,
    transpiler: Box<dyn Transpiler>,
    style: Box<dyn StyleCompiler>,
    renderer: Box<dyn ComponentRenderer>,
    fs: RealFileSystem,
    salt: String,
}

impl Toolset {
    pub fn from_config(config: &Config) -> Self {
        let commands = &config.toolchains;

        let formatter: Box<dyn Formatter> = match &commands.format {
            Some(spec) => Box::new(CommandToolchain::new("formatter", spec.clone())),
            None => Box::new(IdentityFormatter),
        };
        let transpiler: Box<dyn Transpiler> = match &commands.transpile {
            Some(spec) => Box::new(CommandToolchain::new("transpiler", spec.clone())),
            None => Box::new(IdentityTranspiler),
        };
        let style: Box<dyn StyleCompiler> = match &commands.style {
            Some(spec) => Box::new(CommandToolchain::new("style compiler", spec.clone())),
            None => Box::new(SassCompiler),
        };
        let renderer: Box<dyn ComponentRenderer> = match &commands.render {
            Some(spec) => Box::new(CommandToolchain::new("renderer", spec.clone())),
            None => Box::new(UnconfiguredRenderer),
        };

        Self {
            formatter,
            transpiler,
            style,
            renderer,
            fs: RealFileSystem,
            salt: config.salt.clone(),
        }
    }

    pub fn toolchains(&self) -> Toolchains<'_> {
        Toolchains {
            formatter: self.formatter.as_ref(),
            transpiler: self.transpiler.as_ref(),
            style: self.style.as_ref(),
            renderer: self.renderer.as_ref(),
            fs: &self.fs as &dyn FileSystem,
            salt: &self.salt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "sectionsDir": "theme/sections",
            "outDir": "dist",
            "salt": "v2",
            "toolchains": {
                "render": { "program": "node", "args": ["render.mjs"] }
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.sections_dir, "theme/sections");
        assert_eq!(config.snippets_dir, "src/snippets");
        assert_eq!(config.out_dir, "dist");
        assert_eq!(config.salt, "v2");
        assert_eq!(
            config.toolchains.render,
            Some(CommandSpec {
                program: "node".to_string(),
                args: vec!["render.mjs".to_string()],
            })
        );
        assert!(config.toolchains.style.is_none());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sections_dir, "src/sections");
        assert_eq!(config.snippets_dir, "src/snippets");
        assert_eq!(config.out_dir, ".");
        assert!(config.salt.is_empty());
    }

    #[test]
    fn test_missing_config_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.sections_dir, "src/sections");
    }

    #[test]
    fn test_default_toolset_compiles_styles_but_cannot_render() {
        let toolset = Toolset::from_config(&Config::default());
        let toolchains = toolset.toolchains();

        let css = toolchains.style.compile(".a { .b { color: red; } }").unwrap();
        assert!(css.contains(".a .b"));
        let css = toolchains
            .style
            .compile("@mixin big { font-size: 2em; }\n.a { @include big; }")
            .unwrap();
        assert!(css.contains("font-size: 2em;"));
        assert!(!css.contains("@include"));
        assert!(toolchains.renderer.render("x").is_err());
        assert_eq!(toolchains.salt, "");
    }
}
