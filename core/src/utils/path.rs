use std::path::Path;

pub trait PathExtension {
    /// normalize separators and drop trailing slashes
    fn norm_path(&self) -> String;

    /// if path is empty, represent it by "."
    fn display_path(&self) -> String;
}

impl<T: AsRef<Path>> PathExtension for T {
    fn norm_path(&self) -> String {
        let mut path = self.as_ref().to_string_lossy().replace('\\', "/");
        while path.len() > 1 && path.ends_with('/') {
            path.pop();
        }
        path
    }

    fn display_path(&self) -> String {
        let path = self.norm_path();
        match path.is_empty() {
            true => String::from("."),
            false => path,
        }
    }
}
