use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use crate::config::ConfigOption;


const FILE_MODE: u32 = 0o600;


/// An option whose value is a file, e.g. `ca` or `tls-auth`.
///
/// On the command line the content is stored in `file_path` and the path is passed,
/// in a configuration file the content is inlined in a `<name>...</name>` block.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionFile {
    name: String,
    content: String,
    file_path: PathBuf,
}

impl OptionFile {
    pub fn new<N, C, P>(name: N, content: C, file_path: P) -> Self
    where
        N: Into<String>,
        C: Into<String>,
        P: Into<PathBuf>,
    {
        Self {
            name: name.into(),
            content: content.into(),
            file_path: file_path.into(),
        }
    }

    fn write_content(&self) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(FILE_MODE);
        }

        let mut file = options.open(&self.file_path)?;
        file.write_all(self.content.as_bytes())?;
        file.flush()
    }
}

impl ConfigOption for OptionFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn to_cli(&self) -> io::Result<Vec<String>> {
        self.write_content()?;
        Ok(vec![
            format!("--{}", self.name),
            self.file_path.to_string_lossy().into_owned(),
        ])
    }

    fn to_file(&self) -> String {
        // new lines are kept intact, otherwise PEM blocks break
        let escaped = quick_xml::escape::escape(self.content.as_str());
        format!("<{name}>\n{}\n</{name}>", escaped, name = self.name)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const PEM: &str = "-----BEGIN CERTIFICATE-----\nMIIB<&>\n-----END CERTIFICATE-----";

    #[test]
    fn to_file_inlines_escaped_content() {
        let option = OptionFile::new("ca", PEM, "/nonexistent/ca.crt");
        assert_eq!(option.name(), "ca");
        assert_eq!(
            option.to_file(),
            "<ca>\n-----BEGIN CERTIFICATE-----\nMIIB&lt;&amp;&gt;\n-----END CERTIFICATE-----\n</ca>",
        );
    }

    #[test]
    fn to_cli_writes_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ta.key");
        let option = OptionFile::new("tls-auth", PEM, &path);

        let args = option.to_cli().unwrap();
        assert_eq!(args, vec!["--tls-auth".to_string(), path.to_string_lossy().into_owned()]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), PEM);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, FILE_MODE);
        }
    }

    #[test]
    fn to_cli_overwrites_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ca.crt");
        std::fs::write(&path, "previous content which is longer").unwrap();

        OptionFile::new("ca", "new", &path).to_cli().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn to_cli_fails_on_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let option = OptionFile::new("ca", PEM, dir.path().join("missing").join("ca.crt"));
        assert!(option.to_cli().is_err());
    }
}
