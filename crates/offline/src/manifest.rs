use crate::error::{ErrorKind, Result};
use cardscan_net::Url;
use exn::ResultExt;

/// Ordered list of static resources fetched at install time.
///
/// Entries are resolved against the application origin, so `./app.js` and
/// absolute third-party URLs can be mixed freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<Url>,
}
impl Manifest {
    pub fn resolve<S: AsRef<str>>(origin: &Url, entries: impl IntoIterator<Item = S>) -> Result<Self> {
        let entries = entries
            .into_iter()
            .map(|entry| {
                let entry = entry.as_ref();
                origin.join(entry).or_raise(|| ErrorKind::InvalidManifest(entry.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Url] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_and_absolute_entries() {
        let origin = Url::parse("https://scanner.example/app/").unwrap();
        let manifest = Manifest::resolve(
            &origin,
            ["./", "./index.html", "https://cdn.jsdelivr.net/npm/tesseract.js@5/dist/tesseract.min.js"],
        )
        .unwrap();
        let urls: Vec<&str> = manifest.entries().iter().map(Url::as_str).collect();
        assert_eq!(
            urls,
            vec![
                "https://scanner.example/app/",
                "https://scanner.example/app/index.html",
                "https://cdn.jsdelivr.net/npm/tesseract.js@5/dist/tesseract.min.js",
            ]
        );
    }

    #[test]
    fn rejects_unresolvable_entries() {
        let origin = Url::parse("https://scanner.example/").unwrap();
        let err = Manifest::resolve(&origin, ["https://[not-an-ip/"]).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidManifest(_)));
    }
}
