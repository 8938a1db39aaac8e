use crate::auth::hash_password;
use anyhow::{bail, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::io::{self, BufRead, Write};

#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub cost: u32,
}

/// Read a password from stdin and print its bcrypt hash.
/// # Errors
/// Returns an error if stdin cannot be read, the password is empty, or hashing fails.
pub async fn execute(args: Args) -> Result<()> {
    let hash = tokio::task::spawn_blocking(move || -> Result<String> {
        eprint!("Enter the password to hash: ");
        io::stderr().flush().ok();

        let password = read_password(&mut io::stdin().lock())?;
        hash_password(&password, args.cost).context("Failed to hash password")
    })
    .await
    .context("Password hashing task failed")??;

    println!("{hash}");
    eprintln!("Set this as MENUBOARD_AUTH_PASSWORD_HASH");

    Ok(())
}

fn read_password(reader: &mut impl BufRead) -> Result<SecretString> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    let password = SecretString::from(line.trim_end_matches(['\r', '\n']).to_string());
    line.clear();

    if password.expose_secret().is_empty() {
        bail!("Password must not be empty");
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_password_strips_newline() {
        let password = read_password(&mut Cursor::new("hunter2\r\n")).ok();
        assert_eq!(
            password.as_ref().map(|p| p.expose_secret().to_string()),
            Some("hunter2".to_string())
        );
    }

    #[test]
    fn read_password_keeps_inner_spaces() {
        let password = read_password(&mut Cursor::new("  two words \n")).ok();
        assert_eq!(
            password.as_ref().map(|p| p.expose_secret().to_string()),
            Some("  two words ".to_string())
        );
    }

    #[test]
    fn read_password_rejects_empty() {
        assert!(read_password(&mut Cursor::new("\n")).is_err());
        assert!(read_password(&mut Cursor::new("")).is_err());
    }
}
