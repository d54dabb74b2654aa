//! Named pseudo-selector extensions.
//!
//! A custom selector is registered under a name with a typed factory of
//! arity zero to three. The declared argument types drive how the parser
//! consumes the arguments; the factory then receives them already converted.
//!
//! ```
//! use css_selectors::{CustomSelectorRegistry, selector};
//!
//! let registry = CustomSelectorRegistry::<u32>::new();
//! registry.register1("above", |limit: i32| {
//!     let limit = u32::try_from(limit).unwrap_or(0);
//!     selector::filter(move |value: &u32| *value > limit)
//! })?;
//! assert!(registry.contains("above"));
//! # Ok::<(), css_selectors::SelectorError>(())
//! ```

use crate::error::{Result, SelectorError};
use crate::selector::Selector;
use core::any::{Any, TypeId};
use core::fmt;
use log::debug;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::vec;

/// Declared type of a custom selector argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgType {
    /// A quoted string.
    String,
    /// A decimal integer.
    Integer,
    /// A nested selector group.
    SubSelector,
}

impl fmt::Display for ArgType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::SubSelector => "sub-selector",
        })
    }
}

/// A parsed custom selector argument.
pub enum CustomArg<E> {
    String(String),
    Integer(i32),
    SubSelector(Selector<E>),
}

impl<E> CustomArg<E> {
    #[inline]
    pub const fn arg_type(&self) -> ArgType {
        match self {
            Self::String(_) => ArgType::String,
            Self::Integer(_) => ArgType::Integer,
            Self::SubSelector(_) => ArgType::SubSelector,
        }
    }
}

impl<E> fmt::Debug for CustomArg<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(text) => formatter.debug_tuple("String").field(text).finish(),
            Self::Integer(value) => formatter.debug_tuple("Integer").field(value).finish(),
            Self::SubSelector(_) => formatter.write_str("SubSelector(..)"),
        }
    }
}

/// Rust types accepted as custom selector factory parameters.
pub trait CustomArgument<E>: Sized {
    /// Type the parser must read for this parameter.
    const ARG_TYPE: ArgType;

    /// Unwrap a parsed argument of the matching type.
    fn from_arg(arg: CustomArg<E>) -> Option<Self>;
}

impl<E> CustomArgument<E> for String {
    const ARG_TYPE: ArgType = ArgType::String;

    #[inline]
    fn from_arg(arg: CustomArg<E>) -> Option<Self> {
        match arg {
            CustomArg::String(text) => Some(text),
            CustomArg::Integer(_) | CustomArg::SubSelector(_) => None,
        }
    }
}

impl<E> CustomArgument<E> for i32 {
    const ARG_TYPE: ArgType = ArgType::Integer;

    #[inline]
    fn from_arg(arg: CustomArg<E>) -> Option<Self> {
        match arg {
            CustomArg::Integer(value) => Some(value),
            CustomArg::String(_) | CustomArg::SubSelector(_) => None,
        }
    }
}

impl<E> CustomArgument<E> for Selector<E> {
    const ARG_TYPE: ArgType = ArgType::SubSelector;

    #[inline]
    fn from_arg(arg: CustomArg<E>) -> Option<Self> {
        match arg {
            CustomArg::SubSelector(selector) => Some(selector),
            CustomArg::String(_) | CustomArg::Integer(_) => None,
        }
    }
}

/// Factory taking the positional arguments in their parsed form.
type Factory<E> = Arc<dyn Fn(Vec<CustomArg<E>>) -> Result<Selector<E>> + Send + Sync>;

/// A registered custom selector: its factory and declared argument types.
pub struct CustomSelectorInfo<E> {
    name: String,
    factory: Factory<E>,
    arg_types: Vec<ArgType>,
}

impl<E> Clone for CustomSelectorInfo<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            factory: Arc::clone(&self.factory),
            arg_types: self.arg_types.clone(),
        }
    }
}

impl<E> fmt::Debug for CustomSelectorInfo<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CustomSelectorInfo")
            .field("name", &self.name)
            .field("arg_types", &self.arg_types)
            .finish_non_exhaustive()
    }
}

impl<E> CustomSelectorInfo<E> {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument types in declaration order.
    #[inline]
    pub fn arg_types(&self) -> &[ArgType] {
        &self.arg_types
    }

    /// Build the selector stage from parsed arguments.
    ///
    /// # Errors
    /// [`SelectorError::Argument`] when the arguments do not match the
    /// declared types.
    pub fn invoke(&self, args: Vec<CustomArg<E>>) -> Result<Selector<E>> {
        let actual: Vec<ArgType> = args.iter().map(CustomArg::arg_type).collect();
        if actual != self.arg_types {
            return Err(SelectorError::argument(format!(
                "Custom selector '{}' expects arguments {:?} but got {actual:?}.",
                self.name, self.arg_types
            )));
        }
        (self.factory)(args)
    }
}

/// Take the next positional argument as `A`.
fn take_arg<E, A: CustomArgument<E>>(args: &mut vec::IntoIter<CustomArg<E>>) -> Result<A> {
    args.next().and_then(A::from_arg).ok_or_else(|| {
        SelectorError::argument(format!("expected a {} argument", A::ARG_TYPE))
    })
}

/// Process-wide registries, one per element type.
static GLOBAL_REGISTRIES: Lazy<RwLock<FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
    Lazy::new(Default::default);

/// Table mapping pseudo-selector names to factories.
///
/// Lookups take a shared lock and registration an exclusive one, so a
/// registry may be shared freely between threads.
pub struct CustomSelectorRegistry<E> {
    entries: RwLock<FxHashMap<String, CustomSelectorInfo<E>>>,
}

impl<E> Default for CustomSelectorRegistry<E> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
        }
    }
}

impl<E: 'static> fmt::Debug for CustomSelectorRegistry<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CustomSelectorRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl<E: 'static> CustomSelectorRegistry<E> {
    /// An empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared registry for element type `E`, created empty on first use.
    pub fn global() -> Arc<Self> {
        let type_id = TypeId::of::<E>();
        let existing = GLOBAL_REGISTRIES.read().get(&type_id).cloned();
        let shared = existing.unwrap_or_else(|| {
            let mut registries = GLOBAL_REGISTRIES.write();
            Arc::clone(registries.entry(type_id).or_insert_with(|| {
                let registry: Arc<dyn Any + Send + Sync> = Arc::new(Self::new());
                registry
            }))
        });
        // Entries are keyed by the type id of `E`, so the downcast holds.
        shared.downcast::<Self>().unwrap_or_default()
    }

    /// Register a selector taking no arguments.
    ///
    /// # Errors
    /// [`SelectorError::Argument`] if `name` is already registered.
    pub fn register0<F>(&self, name: &str, factory: F) -> Result<()>
    where
        F: Fn() -> Selector<E> + Send + Sync + 'static,
    {
        self.insert(name, Vec::new(), Arc::new(move |_| Ok(factory())))
    }

    /// Register a selector taking one argument.
    ///
    /// # Errors
    /// [`SelectorError::Argument`] if `name` is already registered.
    pub fn register1<A, F>(&self, name: &str, factory: F) -> Result<()>
    where
        A: CustomArgument<E>,
        F: Fn(A) -> Selector<E> + Send + Sync + 'static,
    {
        self.insert(
            name,
            vec![A::ARG_TYPE],
            Arc::new(move |args| {
                let mut args = args.into_iter();
                Ok(factory(take_arg(&mut args)?))
            }),
        )
    }

    /// Register a selector taking two arguments.
    ///
    /// # Errors
    /// [`SelectorError::Argument`] if `name` is already registered.
    pub fn register2<A, B, F>(&self, name: &str, factory: F) -> Result<()>
    where
        A: CustomArgument<E>,
        B: CustomArgument<E>,
        F: Fn(A, B) -> Selector<E> + Send + Sync + 'static,
    {
        self.insert(
            name,
            vec![A::ARG_TYPE, B::ARG_TYPE],
            Arc::new(move |args| {
                let mut args = args.into_iter();
                let first = take_arg(&mut args)?;
                Ok(factory(first, take_arg(&mut args)?))
            }),
        )
    }

    /// Register a selector taking three arguments.
    ///
    /// # Errors
    /// [`SelectorError::Argument`] if `name` is already registered.
    pub fn register3<A, B, C, F>(&self, name: &str, factory: F) -> Result<()>
    where
        A: CustomArgument<E>,
        B: CustomArgument<E>,
        C: CustomArgument<E>,
        F: Fn(A, B, C) -> Selector<E> + Send + Sync + 'static,
    {
        self.insert(
            name,
            vec![A::ARG_TYPE, B::ARG_TYPE, C::ARG_TYPE],
            Arc::new(move |args| {
                let mut args = args.into_iter();
                let first = take_arg(&mut args)?;
                let second = take_arg(&mut args)?;
                Ok(factory(first, second, take_arg(&mut args)?))
            }),
        )
    }

    /// Look up `name`.
    #[inline]
    pub fn get(&self, name: &str) -> Option<CustomSelectorInfo<E>> {
        self.entries.read().get(name).cloned()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    fn insert(&self, name: &str, arg_types: Vec<ArgType>, factory: Factory<E>) -> Result<()> {
        let mut entries = self.entries.write();
        if entries.contains_key(name) {
            return Err(SelectorError::argument(format!(
                "A custom selector named '{name}' is already registered."
            )));
        }
        debug!("registering custom selector '{name}' with arguments {arg_types:?}");
        entries.insert(
            name.to_owned(),
            CustomSelectorInfo {
                name: name.to_owned(),
                factory,
                arg_types,
            },
        );
        Ok(())
    }
}
