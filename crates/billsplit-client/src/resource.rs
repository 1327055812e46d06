//! Tri-state wrappers for data fetched from the server.
//!
//! [`Resource`] answers "do we have it": still loading, loaded, or known not
//! to exist. [`Fetched`] wraps it to separate unexpected failures (transport,
//! server errors) from those expected outcomes. A cached entry is therefore
//! a `Fetched<Resource<T>>`.

use std::future::Future;

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    Loading,
    Loaded(T),
    NotFound,
}

impl<T> Resource<T> {
    /// `Loaded` for `Some`, `NotFound` for `None`: the shape of every
    /// procedure answer that may be `null`.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Resource::Loaded(v),
            None => Resource::NotFound,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Resource::NotFound)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Resource::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_loaded(self) -> Option<T> {
        match self {
            Resource::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Resource<&T> {
        match self {
            Resource::Loading => Resource::Loading,
            Resource::Loaded(v) => Resource::Loaded(v),
            Resource::NotFound => Resource::NotFound,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resource<U> {
        match self {
            Resource::Loading => Resource::Loading,
            Resource::Loaded(v) => Resource::Loaded(f(v)),
            Resource::NotFound => Resource::NotFound,
        }
    }

    /// Like [`Resource::map`] but the loaded value may itself be missing.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Option<U>) -> Resource<U> {
        match self {
            Resource::Loading => Resource::Loading,
            Resource::Loaded(v) => Resource::from_option(f(v)),
            Resource::NotFound => Resource::NotFound,
        }
    }

    /// A resource for one part of a loaded parent, loading or missing
    /// whenever the parent is.
    pub fn project<U>(&self, f: impl FnOnce(&T) -> U) -> Resource<U> {
        self.as_ref().map(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Errored(ClientError),
    Success(T),
}

impl<T> Fetched<T> {
    pub fn success(&self) -> Option<&T> {
        match self {
            Fetched::Success(v) => Some(v),
            Fetched::Errored(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            Fetched::Errored(e) => Some(e),
            Fetched::Success(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Fetched::Errored(e) => Fetched::Errored(e),
            Fetched::Success(v) => Fetched::Success(f(v)),
        }
    }
}

impl<T> From<Result<T, ClientError>> for Fetched<T> {
    fn from(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(v) => Fetched::Success(v),
            Err(e) => Fetched::Errored(e),
        }
    }
}

/// Await a fallible call and capture its outcome as a [`Fetched`].
pub async fn resolve<T>(call: impl Future<Output = Result<T, ClientError>>) -> Fetched<T> {
    call.await.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Parent {
        name: String,
        children: Vec<u32>,
    }

    #[test]
    fn from_option() {
        assert_eq!(Resource::from_option(Some(1)), Resource::Loaded(1));
        assert_eq!(Resource::<i32>::from_option(None), Resource::NotFound);
    }

    #[test]
    fn project_follows_parent_state() {
        let parent = Resource::Loaded(Parent {
            name: "p".into(),
            children: vec![1, 2],
        });
        assert_eq!(parent.project(|p| p.children.len()), Resource::Loaded(2));

        let loading: Resource<Parent> = Resource::Loading;
        assert!(loading.project(|p| p.name.clone()).is_loading());

        let missing: Resource<Parent> = Resource::NotFound;
        assert!(missing.project(|p| p.name.clone()).is_not_found());
    }

    #[test]
    fn and_then_turns_missing_child_into_not_found() {
        let parent = Resource::Loaded(vec![1, 2, 3]);
        assert_eq!(
            parent.clone().and_then(|v| v.into_iter().find(|x| *x == 2)),
            Resource::Loaded(2)
        );
        assert!(parent.and_then(|v| v.into_iter().find(|x| *x == 9)).is_not_found());
    }

    #[tokio::test]
    async fn resolve_captures_errors() {
        let ok = resolve(async { Ok::<_, ClientError>(5) }).await;
        assert_eq!(ok, Fetched::Success(5));

        let err = resolve(async {
            Err::<i32, _>(ClientError::Transport("connection refused".into()))
        })
        .await;
        assert!(matches!(err, Fetched::Errored(ClientError::Transport(_))));
        assert!(err.success().is_none());
    }
}
