//! The compiled template namespace and its handles.
//!
//! All templates discovered by a [`TemplateManager`](crate::TemplateManager)
//! share one namespace: one delimiter pair, one set of function bindings, and
//! one name space in which every alias resolves. Templates can therefore pull
//! each other in by any alias:
//!
//! ```jinja
//! {# pages/page-1.html #}
//! <main>{% include "atoms-atom-1" %}</main>
//! ```
//!
//! ## Key Types
//!
//! - [`CompiledTemplate`]: Owned handle describing one compiled file
//! - [`FuncMap`]: Callables exposed to every template
//! - [`NAMESPACE_ROOT`]: Internal name of the namespace, never a template

mod functions;
pub(crate) mod namespace;
mod registry;

pub use functions::FuncMap;
pub use namespace::NAMESPACE_ROOT;
pub use registry::CompiledTemplate;
