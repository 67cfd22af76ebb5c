//! Turning resource references into URLs.

use url::Url;

use crate::error::MappingError;
use crate::mapping::result::ResourceRef;

/// Resolves a resource reference to the URL a client is sent to.
pub trait ResourceResolver: Send + Sync {
    fn resolve(&self, reference: &ResourceRef) -> Result<String, MappingError>;
}

impl<F> ResourceResolver for F
where
    F: Fn(&ResourceRef) -> Result<String, MappingError> + Send + Sync,
{
    fn resolve(&self, reference: &ResourceRef) -> Result<String, MappingError> {
        self(reference)
    }
}

/// Resolves pages to `<base>/<action>/<segment>/...`, percent-encoding each
/// segment. Other reference kinds are rejected.
#[derive(Debug, Clone)]
pub struct PageUrlResolver {
    root: Url,
    absolute: bool,
}

impl PageUrlResolver {
    /// `base` is either a path (`/wiki/`) or an absolute URL.
    pub fn new(base: &str) -> Result<Self, url::ParseError> {
        match Url::parse(base) {
            Ok(root) => Ok(Self { root, absolute: true }),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let root = Url::parse("http://localhost/")?.join(base)?;
                Ok(Self { root, absolute: false })
            }
            Err(e) => Err(e),
        }
    }
}

impl ResourceResolver for PageUrlResolver {
    fn resolve(&self, reference: &ResourceRef) -> Result<String, MappingError> {
        let ResourceRef::Page { segments, action } = reference else {
            return Err(MappingError::UnsupportedTarget(reference.kind().to_string()));
        };

        let mut url = self.root.clone();
        url.path_segments_mut()
            .map_err(|_| MappingError::UnsupportedTarget(reference.kind().to_string()))?
            .pop_if_empty()
            .push(action)
            .extend(segments);

        if self.absolute {
            Ok(url.to_string())
        } else {
            Ok(url.path().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_base() {
        let resolver = PageUrlResolver::new("/").unwrap();
        let url = resolver.resolve(&ResourceRef::page(["Main", "My Doc"])).unwrap();
        assert_eq!(url, "/view/Main/My%20Doc");

        let resolver = PageUrlResolver::new("/wiki/").unwrap();
        let url = resolver
            .resolve(&ResourceRef::page_with_action(["Main"], "edit"))
            .unwrap();
        assert_eq!(url, "/wiki/edit/Main");
    }

    #[test]
    fn test_absolute_base() {
        let resolver = PageUrlResolver::new("https://example.org/wiki/").unwrap();
        let url = resolver.resolve(&ResourceRef::page(["Main"])).unwrap();
        assert_eq!(url, "https://example.org/wiki/view/Main");
    }

    #[test]
    fn test_unsupported_kind() {
        let resolver = PageUrlResolver::new("/").unwrap();
        let err = resolver
            .resolve(&ResourceRef::Other {
                kind: "attachment".into(),
                reference: "a.png".into(),
            })
            .unwrap_err();
        assert!(matches!(err, MappingError::UnsupportedTarget(kind) if kind == "attachment"));
    }
}
