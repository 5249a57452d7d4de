use std::fmt;
use std::marker::PhantomData;

use crate::action::Action;
use crate::reducer::Reducer;
use crate::state_tree::{SliceState, StateTree};

/// Root reducer combinator: a fixed registry mapping slice names to their
/// reducers, itself a [`Reducer`] over the whole [`StateTree`].
pub struct Slices<A: Action> {
    entries: Vec<SliceEntry<A>>,
}

struct SliceEntry<A: Action> {
    name: &'static str,
    reducer: Box<dyn ErasedSliceReducer<A> + Send + Sync>,
}

trait ErasedSliceReducer<A: Action> {
    fn initial(&self) -> Box<dyn SliceState>;
    fn reduce(&self, prev: Option<&dyn SliceState>, action: &A) -> Box<dyn SliceState>;
}

struct TypedSlice<S, R> {
    reducer: R,
    _state: PhantomData<fn() -> S>,
}

impl<S, R, A> ErasedSliceReducer<A> for TypedSlice<S, R>
where
    A: Action,
    S: fmt::Debug + Clone + Send + Sync + 'static,
    R: Reducer<S, A>,
{
    fn initial(&self) -> Box<dyn SliceState> {
        Box::new(self.reducer.initial())
    }

    fn reduce(&self, prev: Option<&dyn SliceState>, action: &A) -> Box<dyn SliceState> {
        match prev.and_then(|slice| slice.as_any().downcast_ref::<S>()) {
            Some(state) => Box::new(self.reducer.reduce(state, action)),
            // Slice missing from the previous tree: start it from the
            // reducer's declared default.
            None => Box::new(self.reducer.reduce(&self.reducer.initial(), action)),
        }
    }
}

impl<A: Action> Slices<A> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers `reducer` as the owner of the `name` slice. The registry is
    /// fixed once the store is built; duplicate names are a programmer error
    /// and panic here.
    pub fn slice<S, R>(mut self, name: &'static str, reducer: R) -> Self
    where
        S: fmt::Debug + Clone + Send + Sync + 'static,
        R: Reducer<S, A> + Send + Sync + 'static,
    {
        assert!(
            self.entries.iter().all(|entry| entry.name != name),
            "duplicate slice name {name:?}"
        );
        self.entries.push(SliceEntry {
            name,
            reducer: Box::new(TypedSlice {
                reducer,
                _state: PhantomData,
            }),
        });
        self
    }
}

impl<A: Action> Default for Slices<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> Reducer<StateTree, A> for Slices<A> {
    fn initial(&self) -> StateTree {
        let mut tree = StateTree::new();
        for entry in &self.entries {
            tree.insert(entry.name, entry.reducer.initial());
        }
        tree
    }

    /// Assembles a fresh tree on every call, even when each slice comes back
    /// unchanged. There is deliberately no deep-equality short-circuit;
    /// callers that need change detection diff the slices themselves.
    fn reduce(&self, prev: &StateTree, action: &A) -> StateTree {
        let mut tree = StateTree::new();
        for entry in &self.entries {
            tree.insert(entry.name, entry.reducer.reduce(prev.get(entry.name), action));
        }
        tree
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Feed {
        articles: Vec<String>,
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Settings {
        opened: u32,
    }

    #[derive(Debug)]
    enum AppAction {
        FeedLoaded(Vec<String>),
        FeedUnloaded,
        SettingsOpened,
        Nonsense,
    }

    impl Action for AppAction {
        fn kind(&self) -> &'static str {
            match self {
                AppAction::FeedLoaded(_) => "FEED_LOADED",
                AppAction::FeedUnloaded => "FEED_UNLOADED",
                AppAction::SettingsOpened => "SETTINGS_OPENED",
                AppAction::Nonsense => "NONSENSE",
            }
        }
    }

    struct FeedReducer;

    impl Reducer<Feed, AppAction> for FeedReducer {
        fn initial(&self) -> Feed {
            Feed::default()
        }

        fn reduce(&self, state: &Feed, action: &AppAction) -> Feed {
            match action {
                AppAction::FeedLoaded(articles) => Feed {
                    articles: articles.clone(),
                },
                AppAction::FeedUnloaded => self.initial(),
                _ => state.clone(),
            }
        }
    }

    struct SettingsReducer;

    impl Reducer<Settings, AppAction> for SettingsReducer {
        fn initial(&self) -> Settings {
            Settings::default()
        }

        fn reduce(&self, state: &Settings, action: &AppAction) -> Settings {
            match action {
                AppAction::SettingsOpened => Settings {
                    opened: state.opened + 1,
                },
                _ => state.clone(),
            }
        }
    }

    fn registry() -> Slices<AppAction> {
        Slices::new()
            .slice("feed", FeedReducer)
            .slice("settings", SettingsReducer)
    }

    #[test]
    fn unknown_kind_leaves_every_slice_unchanged() {
        let slices = registry();
        let initial = slices.initial();
        let tree = slices.reduce(&initial, &AppAction::Nonsense);
        let tree = slices.reduce(&tree, &AppAction::Nonsense);
        assert_eq!(tree.slice::<Feed>("feed"), initial.slice::<Feed>("feed"));
        assert_eq!(
            tree.slice::<Settings>("settings"),
            initial.slice::<Settings>("settings")
        );
    }

    #[test]
    fn recognized_action_touches_only_its_slice() {
        let slices = registry();
        let tree = slices.reduce(&slices.initial(), &AppAction::SettingsOpened);
        assert_eq!(tree.slice::<Settings>("settings").unwrap().opened, 1);
        assert_eq!(tree.slice::<Feed>("feed"), Some(&Feed::default()));
    }

    #[test]
    fn absent_slice_starts_from_its_default() {
        let slices = registry();
        let tree = slices.reduce(&StateTree::new(), &AppAction::SettingsOpened);
        assert_eq!(tree.slice::<Feed>("feed"), Some(&Feed::default()));
        assert_eq!(tree.slice::<Settings>("settings").unwrap().opened, 1);
    }

    #[test]
    fn unloaded_after_loaded_round_trips_to_default() {
        let slices = registry();
        let loaded = slices.reduce(
            &slices.initial(),
            &AppAction::FeedLoaded(vec!["a".into(), "b".into()]),
        );
        assert_eq!(loaded.slice::<Feed>("feed").unwrap().articles.len(), 2);
        let unloaded = slices.reduce(&loaded, &AppAction::FeedUnloaded);
        assert_eq!(unloaded.slice::<Feed>("feed"), Some(&Feed::default()));
    }

    #[test]
    #[should_panic(expected = "duplicate slice name")]
    fn duplicate_slice_name_panics() {
        let _ = Slices::new()
            .slice("feed", FeedReducer)
            .slice("feed", FeedReducer);
    }
}
