//! The compiled template namespace.
//!
//! A [`Namespace`] wraps one MiniJinja [`Environment`] holding every compiled
//! template, plus the bookkeeping needed to answer lookups by alias. It is not
//! synchronized itself; [`TemplateManager`] keeps it behind a mutex.
//!
//! # Aliases
//!
//! MiniJinja cannot attach one compiled body to a second name, so each alias is
//! registered by compiling the same source again under that name. The long
//! alias is compiled first; only when it succeeds are the remaining aliases
//! added, so a syntax error is reported once, against the canonical name.
//!
//! Alias collisions are last-writer-wins. The overwritten registration is
//! logged at `warn` with both file paths.
//!
//! # Escaping
//!
//! Every template is rendered with HTML auto-escaping, whatever its name or
//! extension, so `top-level` and `top-level.html` behave identically.
//!
//! [`TemplateManager`]: crate::TemplateManager

use std::collections::HashMap;
use std::io;

use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use tracing::{debug, warn};

use super::functions::FuncMap;
use super::registry::CompiledTemplate;
use crate::alias::TemplateAliases;
use crate::error::ManagerError;
use crate::file_loader::TemplateFile;

/// Name of the namespace itself. Never registered as a template, so a file
/// literally named `root` cannot collide with it.
pub const NAMESPACE_ROOT: &str = "atomic-template-manager";

pub(crate) struct Namespace {
    env: Environment<'static>,
    /// Every successfully compiled file, in compile order.
    templates: Vec<CompiledTemplate>,
    /// Alias → index into `templates`.
    names: HashMap<String, usize>,
}

impl Namespace {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        Self {
            env,
            templates: Vec::new(),
            names: HashMap::new(),
        }
    }

    /// Applies a syntax and function bindings to the whole namespace.
    ///
    /// Must run before any template is added: templates are parsed with the
    /// syntax in effect when they are compiled.
    pub fn configure(&mut self, syntax: SyntaxConfig, funcs: &FuncMap) {
        self.env.set_syntax(syntax);
        funcs.apply(&mut self.env);
    }

    /// Compiles `source` under every alias and records the template.
    pub fn insert(
        &mut self,
        file: &TemplateFile,
        aliases: &TemplateAliases,
        source: String,
    ) -> Result<CompiledTemplate, ManagerError> {
        let names = aliases.names();
        let canonical = names[0];

        self.env
            .add_template_owned(canonical.to_string(), source.clone())
            .map_err(|e| ManagerError::parse(canonical, &file.path, &e))?;
        for alias in &names[1..] {
            self.env
                .add_template_owned(alias.to_string(), source.clone())
                .map_err(|e| ManagerError::parse(*alias, &file.path, &e))?;
        }

        let compiled = CompiledTemplate::new(aliases, &file.path, &file.root, source);
        let index = self.templates.len();
        self.templates.push(compiled.clone());

        for alias in names {
            if let Some(previous) = self.names.insert(alias.to_string(), index) {
                let previous = &self.templates[previous];
                if previous.path() != file.path.as_path() {
                    warn!(
                        alias,
                        previous = %previous.path().display(),
                        replacement = %file.path.display(),
                        "template alias collision, last registration wins"
                    );
                }
            }
        }

        debug!(name = canonical, aliases = ?compiled.aliases(), "compiled template");
        Ok(compiled)
    }

    pub fn lookup(&self, name: &str) -> Option<CompiledTemplate> {
        self.names.get(name).map(|&i| self.templates[i].clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn templates(&self) -> &[CompiledTemplate] {
        &self.templates
    }

    /// Every registered alias, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.keys().cloned().collect();
        names.sort();
        names
    }

    /// Renders `name` with `data` into `writer`.
    pub fn render_to_write<W, S>(&self, name: &str, data: &S, writer: W) -> Result<(), ManagerError>
    where
        W: io::Write,
        S: Serialize + ?Sized,
    {
        if !self.contains(name) {
            return Err(ManagerError::TemplateNotFound(name.to_string()));
        }
        let tmpl = self.env.get_template(name)?;
        tmpl.render_captured_to(data, writer).map_err(|err| {
            // Sink failures surface as engine write errors.
            match err.kind() {
                minijinja::ErrorKind::WriteFailure => {
                    ManagerError::Io(io::Error::other(err.to_string()))
                }
                _ => ManagerError::from(err),
            }
        })?;
        Ok(())
    }
}
