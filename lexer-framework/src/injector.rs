//! Typed dependency injection for rule actions.
//!
//! An action is a plain closure whose parameters are drawn from the
//! providers available at dispatch time: per-run state cells (`State<T>`),
//! the current [`Matches`] and the [`Position`] where the match started.
//! Each parameter type knows which provider it needs, so the lexer can check
//! every action against the declared state types before any input is read.

use crate::error::ConfigError;
use crate::matches::Matches;
use crate::traits::{Emit, IntoEmit};
use std::any::{Any, TypeId};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use stream_framework::Position;

/// A provider an action parameter depends on, identified by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl Requirement {
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }
}

struct StateCell {
    type_name: &'static str,
    value: RefCell<Box<dyn Any + Send>>,
}

/// One live value per declared state type, keyed by type.
#[derive(Default)]
pub struct StateRegistry {
    cells: HashMap<TypeId, StateCell>,
}

impl StateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` as the cell for `T`, replacing any previous one.
    pub fn insert<T: Any + Send>(&mut self, value: T) {
        self.insert_boxed(Requirement::of::<T>(), Box::new(value));
    }

    pub(crate) fn insert_boxed(&mut self, key: Requirement, value: Box<dyn Any + Send>) {
        self.cells.insert(
            key.type_id,
            StateCell {
                type_name: key.type_name,
                value: RefCell::new(value),
            },
        );
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.cells.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Shared view of the cell for `T`, if declared and not mutably borrowed.
    pub fn get<T: 'static>(&self) -> Option<Ref<'_, T>> {
        let cell = self.cells.get(&TypeId::of::<T>())?;
        let value = cell.value.try_borrow().ok()?;
        Ref::filter_map(value, |boxed| (**boxed).downcast_ref::<T>()).ok()
    }

    /// Exclusive handle to the cell for `T`.
    pub fn get_mut<T: 'static>(&self) -> Result<RefMut<'_, T>, ConfigError> {
        let unavailable = || ConfigError::StateUnavailable {
            type_name: std::any::type_name::<T>(),
        };
        let cell = self.cells.get(&TypeId::of::<T>()).ok_or_else(unavailable)?;
        let value = cell.value.try_borrow_mut().map_err(|_| unavailable())?;
        RefMut::filter_map(value, |boxed| (**boxed).downcast_mut::<T>()).map_err(|_| unavailable())
    }
}

impl std::fmt::Debug for StateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(self.cells.values().map(|cell| cell.type_name))
            .finish()
    }
}

/// Everything an action can ask for during one dispatch.
pub struct ActionContext<'r> {
    states: &'r StateRegistry,
    matches: &'r Matches,
    position: Position,
}

impl<'r> ActionContext<'r> {
    pub fn new(states: &'r StateRegistry, matches: &'r Matches, position: Position) -> Self {
        Self {
            states,
            matches,
            position,
        }
    }
}

/// A type usable as an action parameter.
pub trait Param {
    /// The value actually handed to the action for one dispatch.
    type Item<'r>;

    /// The state cell this parameter needs, or `None` if the scanner always
    /// provides it.
    fn requirement() -> Option<Requirement>;

    fn fetch<'r>(cx: &ActionContext<'r>) -> Result<Self::Item<'r>, ConfigError>;
}

pub type ParamItem<'r, P> = <P as Param>::Item<'r>;

/// Mutable handle to the per-run state cell of type `T`.
///
/// `T` must have been registered with
/// [`LexerBuilder::declare_state`](crate::LexerBuilder::declare_state).
pub struct State<'r, T: 'static> {
    value: RefMut<'r, T>,
}

impl<T: 'static> Deref for State<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: 'static> DerefMut for State<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for State<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("State").field(&*self.value).finish()
    }
}

impl<T: Any + Send> Param for State<'_, T> {
    type Item<'r> = State<'r, T>;

    fn requirement() -> Option<Requirement> {
        Some(Requirement::of::<T>())
    }

    fn fetch<'r>(cx: &ActionContext<'r>) -> Result<State<'r, T>, ConfigError> {
        let value = cx.states.get_mut::<T>()?;
        Ok(State { value })
    }
}

impl Param for &Matches {
    type Item<'r> = &'r Matches;

    fn requirement() -> Option<Requirement> {
        None
    }

    fn fetch<'r>(cx: &ActionContext<'r>) -> Result<&'r Matches, ConfigError> {
        Ok(cx.matches)
    }
}

/// Start of the current match.
impl Param for Position {
    type Item<'r> = Position;

    fn requirement() -> Option<Requirement> {
        None
    }

    fn fetch<'r>(cx: &ActionContext<'r>) -> Result<Position, ConfigError> {
        Ok(cx.position)
    }
}

/// An action with its parameter types erased.
pub trait ErasedAction<Tok>: Send + Sync {
    fn invoke(&self, cx: &ActionContext<'_>) -> Result<Emit<Tok>, ConfigError>;
}

pub type BoxedAction<Tok> = Box<dyn ErasedAction<Tok>>;

/// Conversion from a closure to an erased action.
///
/// `Marker` is the closure's signature as a `fn` pointer type; it only exists
/// so the impls for different arities do not overlap.
pub trait IntoAction<Tok, Marker> {
    fn requirements() -> Vec<Requirement>;

    fn into_action(self) -> BoxedAction<Tok>;
}

pub struct FunctionAction<F, Marker> {
    func: F,
    _marker: PhantomData<fn() -> Marker>,
}

macro_rules! impl_into_action {
    ($($param:ident),*) => {
        #[allow(non_snake_case)]
        impl<Tok, Func, Out, $($param: Param),*> IntoAction<Tok, fn($($param,)*) -> Out> for Func
        where
            Tok: 'static,
            Out: IntoEmit<Tok> + 'static,
            $($param: 'static,)*
            Func: Send + Sync + 'static,
            for<'a> &'a Func: Fn($($param),*) -> Out + Fn($(ParamItem<'_, $param>),*) -> Out,
        {
            fn requirements() -> Vec<Requirement> {
                #[allow(unused_mut)]
                let mut requirements = Vec::new();
                $(requirements.extend($param::requirement());)*
                requirements
            }

            fn into_action(self) -> BoxedAction<Tok> {
                Box::new(FunctionAction::<Func, fn($($param,)*) -> Out> {
                    func: self,
                    _marker: PhantomData,
                })
            }
        }

        #[allow(non_snake_case)]
        impl<Tok, Func, Out, $($param: Param),*> ErasedAction<Tok>
            for FunctionAction<Func, fn($($param,)*) -> Out>
        where
            Out: IntoEmit<Tok>,
            Func: Send + Sync,
            for<'a> &'a Func: Fn($($param),*) -> Out + Fn($(ParamItem<'_, $param>),*) -> Out,
        {
            #[allow(unused_variables)]
            fn invoke(&self, cx: &ActionContext<'_>) -> Result<Emit<Tok>, ConfigError> {
                // Pins the call to the `ParamItem` signature.
                fn call_inner<Out, $($param),*>(
                    func: impl Fn($($param),*) -> Out,
                    $($param: $param,)*
                ) -> Out {
                    func($($param),*)
                }

                $(let $param = $param::fetch(cx)?;)*
                Ok(call_inner(&self.func, $($param),*).into_emit())
            }
        }
    };
}

impl_into_action!();
impl_into_action!(P1);
impl_into_action!(P1, P2);
impl_into_action!(P1, P2, P3);
impl_into_action!(P1, P2, P3, P4);
impl_into_action!(P1, P2, P3, P4, P5);
impl_into_action!(P1, P2, P3, P4, P5, P6);
impl_into_action!(P1, P2, P3, P4, P5, P6, P7);
impl_into_action!(P1, P2, P3, P4, P5, P6, P7, P8);
