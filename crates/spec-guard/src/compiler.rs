// crates/spec-guard/src/compiler.rs
// ============================================================================
// Module: Scope Compiler
// Description: Turns specification command streams into the scope graph.
// Purpose: Memoize specifications by identity and register every error once.
// Dependencies: tracing, crate::{discovery, error, path, registry, scheme, scope, specification}
// ============================================================================

//! ## Overview
//! Compilation walks a specification's commands left to right. Every rule or
//! scope command greedily takes the modifiers that follow it, and the group
//! becomes one [`CommandScope`]. A presence command is only accepted first.
//!
//! Nested specifications go through [`ScopeCompiler::get_or_register_scope`],
//! which reserves an id before compiling the body. A second request for the
//! same handle returns the reserved id, which is how self-referencing and
//! shared specifications compile to a single scope.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::discovery::DiscoveryContext;
use crate::error::IntegrityError;
use crate::error::SpecificationError;
use crate::path;
use crate::registry::ErrorBuilder;
use crate::registry::ErrorId;
use crate::registry::ErrorRegistry;
use crate::registry::FORBIDDEN_MESSAGE_KEY;
use crate::registry::GENERIC_MESSAGE_KEY;
use crate::registry::REQUIRED_MESSAGE_KEY;
use crate::scheme::ModelScheme;
use crate::scope::Action;
use crate::scope::CommandScope;
use crate::scope::ErasedScope;
use crate::scope::Presence;
use crate::scope::ScopeId;
use crate::scope::SpecificationScope;
use crate::specification::Command;
use crate::specification::Modifier;
use crate::specification::Predicate;
use crate::specification::Specification;

// ============================================================================
// SECTION: Compiler
// ============================================================================

/// Identity of a specification handle: model type plus cell address.
type SpecificationKey = (TypeId, usize);

/// Single-pass compiler from specifications to a [`ModelScheme`].
pub struct ScopeCompiler {
    /// Errors registered so far.
    registry: ErrorRegistry,
    /// Scope slots; `None` while a slot is reserved but not yet compiled.
    scopes: Vec<Option<Box<dyn ErasedScope>>>,
    /// Scope ids by specification identity.
    seen: HashMap<SpecificationKey, ScopeId>,
    /// Handles kept alive so their addresses stay unique.
    retained: Vec<Arc<dyn Any + Send + Sync>>,
}

impl ScopeCompiler {
    /// Maximum number of scopes a scheme can hold.
    const MAX_SCOPES: usize = u32::MAX as usize;

    /// Creates an empty compiler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: ErrorRegistry::new(),
            scopes: Vec::new(),
            seen: HashMap::new(),
            retained: Vec::new(),
        }
    }

    /// Compiles a root specification into a scheme.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError`] for any authoring mistake reachable from
    /// the root.
    pub fn compile<T: 'static>(
        specification: &Specification<T>,
    ) -> Result<ModelScheme, SpecificationError> {
        let mut compiler = Self::new();
        let root = compiler.get_or_register_scope(specification)?;
        compiler.finish(root)
    }

    /// Returns the scope id of a specification, compiling it on first sight.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError`] when the specification or anything it
    /// references is malformed.
    pub fn get_or_register_scope<T: 'static>(
        &mut self,
        specification: &Specification<T>,
    ) -> Result<ScopeId, SpecificationError> {
        let cell = specification.upgrade()?;
        let key = (TypeId::of::<T>(), Arc::as_ptr(&cell).cast::<()>().addr());
        if let Some(id) = self.seen.get(&key) {
            return Ok(*id);
        }

        let id = self.reserve()?;
        self.seen.insert(key, id);
        let commands = cell.evaluate()?;
        self.retained.push(cell as Arc<dyn Any + Send + Sync>);
        let scope = self.compile_commands(commands)?;
        if let Some(slot) = self.scopes.get_mut(id.index()) {
            *slot = Some(Box::new(scope));
        }
        Ok(id)
    }

    /// Returns the number of scopes reserved so far.
    #[must_use]
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Returns the errors registered so far.
    #[must_use]
    pub const fn errors(&self) -> &ErrorRegistry {
        &self.registry
    }

    /// Runs discovery from `root` and seals the scheme.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError::Integrity`] when a reserved scope was never
    /// compiled or discovery reaches an unknown scope.
    pub fn finish(self, root: ScopeId) -> Result<ModelScheme, SpecificationError> {
        let scopes = self
            .scopes
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    IntegrityError::UnfilledScope(ScopeId(u32::try_from(index).unwrap_or(u32::MAX)))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let root_scope = scopes.get(root.index()).ok_or(IntegrityError::MissingScope(root))?;
        let root_type = (root_scope.model_type(), root_scope.type_name());

        let discovery = DiscoveryContext::new(&scopes).run(root)?;
        debug!(
            root_type = root_type.1,
            scopes = scopes.len(),
            errors = self.registry.len(),
            template_paths = discovery.template.len(),
            reference_loop_possible = discovery.reference_loop_possible,
            "compiled specification"
        );

        Ok(ModelScheme::new(scopes, root, root_type, self.registry, discovery, self.retained))
    }

    /// Reserves the next scope slot.
    fn reserve(&mut self) -> Result<ScopeId, SpecificationError> {
        let index = self.scopes.len();
        let overflow = || SpecificationError::ScopeOverflow {
            max_scopes: Self::MAX_SCOPES,
            attempted: index + 1,
        };
        if index >= Self::MAX_SCOPES {
            return Err(overflow());
        }
        let id = u32::try_from(index).map_err(|_| overflow())?;
        self.scopes.push(None);
        Ok(ScopeId(id))
    }

    // ------------------------------------------------------------------------
    // Command grouping
    // ------------------------------------------------------------------------

    /// Compiles one specification's command stream.
    fn compile_commands<T: 'static>(
        &mut self,
        commands: Vec<Command<T>>,
    ) -> Result<SpecificationScope<T>, SpecificationError> {
        let mut scope = SpecificationScope {
            presence: Presence::Required,
            required_error: ErrorId::REQUIRED,
            forbidden_error: ErrorId::FORBIDDEN,
            commands: Vec::new(),
        };

        let mut iter = commands.into_iter().peekable();
        let mut first = true;
        while let Some(command) = iter.next() {
            let mut modifiers = Vec::new();
            while let Some(Command::Modifier(modifier)) =
                iter.next_if(|next| matches!(next, Command::Modifier(_)))
            {
                modifiers.push(modifier);
            }

            match command {
                Command::Presence(presence) => {
                    if !first {
                        return Err(SpecificationError::PresenceNotFirst {
                            presence: presence.name(),
                        });
                    }
                    self.compile_presence(&mut scope, presence, modifiers)?;
                }
                Command::Modifier(modifier) => {
                    return Err(SpecificationError::ModifierWithoutCommand {
                        modifier: modifier.name(),
                    });
                }
                Command::Rule {
                    predicate,
                    message,
                    args,
                } => {
                    let seeded = message.is_some();
                    let builder = match message {
                        Some(key) if key.is_empty() => return Err(SpecificationError::EmptyMessage),
                        Some(key) => ErrorBuilder::seeded(&key, args),
                        None => ErrorBuilder::seeded(GENERIC_MESSAGE_KEY, Vec::new()),
                    };
                    let shaped = shape(builder, modifiers, "rule")?;
                    let error = if shaped.errors.is_empty() || !(seeded || shaped.errors.is_touched())
                    {
                        ErrorId::GENERIC
                    } else {
                        self.registry.register(shaped.errors.into_descriptor())?
                    };
                    scope.commands.push(CommandScope {
                        path: shaped.path,
                        condition: shaped.condition,
                        action: Action::Rule {
                            predicate,
                            error,
                        },
                    });
                }
                Command::Scope(command) => {
                    let mut shaped = shape(ErrorBuilder::default(), modifiers, command.kind)?;
                    if shaped.path.is_none() {
                        shaped.path = command.default_path.map(checked_name).transpose()?;
                    }
                    let error = if shaped.errors.is_empty() {
                        None
                    } else {
                        let mode = shaped.errors.mode();
                        Some((self.registry.register(shaped.errors.into_descriptor())?, mode))
                    };
                    let body = (command.compile)(self)?;
                    scope.commands.push(CommandScope {
                        path: shaped.path,
                        condition: shaped.condition,
                        action: Action::Nested {
                            body,
                            error,
                        },
                    });
                }
            }
            first = false;
        }

        Ok(scope)
    }

    /// Applies a leading presence command and its error modifiers.
    fn compile_presence<T: 'static>(
        &mut self,
        scope: &mut SpecificationScope<T>,
        presence: Presence,
        modifiers: Vec<Modifier<T>>,
    ) -> Result<(), SpecificationError> {
        scope.presence = presence;
        let key = match presence {
            Presence::Optional => {
                return match modifiers.first() {
                    Some(modifier) => Err(SpecificationError::ModifierNotAllowed {
                        modifier: modifier.name(),
                        command: presence.name(),
                    }),
                    None => Ok(()),
                };
            }
            Presence::Required => REQUIRED_MESSAGE_KEY,
            Presence::Forbidden => FORBIDDEN_MESSAGE_KEY,
        };

        let mut builder = ErrorBuilder::seeded(key, Vec::new());
        for modifier in modifiers {
            apply_error_modifier(&mut builder, modifier, presence.name())?;
        }
        if !builder.is_touched() || builder.is_empty() {
            return Ok(());
        }

        let id = self.registry.register(builder.into_descriptor())?;
        match presence {
            Presence::Required => scope.required_error = id,
            Presence::Forbidden => scope.forbidden_error = id,
            Presence::Optional => {}
        }
        Ok(())
    }
}

impl Default for ScopeCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScopeCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeCompiler")
            .field("scopes", &self.scopes.len())
            .field("errors", &self.registry.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Modifier Shaping
// ============================================================================

/// Result of applying a run of modifiers.
struct Shaped<T: 'static> {
    /// Error shaping.
    errors: ErrorBuilder,
    /// Relative path.
    path: Option<String>,
    /// Execution condition.
    condition: Option<Predicate<T>>,
}

/// Applies the modifiers that follow a rule or scope command.
fn shape<T: 'static>(
    errors: ErrorBuilder,
    modifiers: Vec<Modifier<T>>,
    command: &'static str,
) -> Result<Shaped<T>, SpecificationError> {
    let mut shaped = Shaped {
        errors,
        path: None,
        condition: None,
    };

    for modifier in modifiers {
        match modifier {
            Modifier::Condition(condition) => {
                if shaped.condition.is_some() {
                    return Err(SpecificationError::DuplicateModifier {
                        modifier: "with_condition",
                        command,
                    });
                }
                shaped.condition = Some(condition);
            }
            Modifier::Name(name) => {
                set_path(&mut shaped.path, checked_name(name)?, "with_name", command)?;
            }
            Modifier::Path(relative) => {
                if !path::is_valid_relative_path(&relative) {
                    return Err(SpecificationError::InvalidPath(relative));
                }
                set_path(&mut shaped.path, relative, "with_path", command)?;
            }
            other => apply_error_modifier(&mut shaped.errors, other, command)?,
        }
    }

    Ok(shaped)
}

/// Sets the single path slot of a command.
fn set_path(
    slot: &mut Option<String>,
    value: String,
    modifier: &'static str,
    command: &'static str,
) -> Result<(), SpecificationError> {
    if slot.is_some() {
        return Err(SpecificationError::DuplicateModifier {
            modifier,
            command,
        });
    }
    *slot = Some(value);
    Ok(())
}

/// Applies one message/code modifier.
fn apply_error_modifier<T: 'static>(
    builder: &mut ErrorBuilder,
    modifier: Modifier<T>,
    command: &'static str,
) -> Result<(), SpecificationError> {
    match modifier {
        Modifier::Message(message) => builder.set_message(checked_message(message)?),
        Modifier::ExtraMessage(message) => builder.add_message(checked_message(message)?),
        Modifier::Code(code) => builder.set_code(checked_code(code)?),
        Modifier::ExtraCode(code) => builder.add_code(checked_code(code)?),
        Modifier::Clear => builder.clear(),
        other => {
            return Err(SpecificationError::ModifierNotAllowed {
                modifier: other.name(),
                command,
            });
        }
    }
    Ok(())
}

/// Rejects names that are not a single path segment.
fn checked_name(name: String) -> Result<String, SpecificationError> {
    if path::is_valid_segment(&name) { Ok(name) } else { Err(SpecificationError::InvalidName(name)) }
}

/// Rejects empty messages.
fn checked_message(message: String) -> Result<String, SpecificationError> {
    if message.is_empty() { Err(SpecificationError::EmptyMessage) } else { Ok(message) }
}

/// Rejects empty codes and codes containing whitespace.
fn checked_code(code: String) -> Result<String, SpecificationError> {
    if code.is_empty() || code.chars().any(char::is_whitespace) {
        Err(SpecificationError::InvalidCode(code))
    } else {
        Ok(code)
    }
}

#[cfg(test)]
mod tests;
