use crate::infra::{CareerStore, ContactStore};
use chrono::{DateTime, Utc};
use clap::Args;
use crsel_site::error::AppError;
use crsel_site::submissions::{CareerApplication, ContactSubmission, Record, RecordStore};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct InboxArgs {
    /// Directory holding the record collections
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    pub(crate) data_dir: PathBuf,
    /// Only show records not yet marked read
    #[arg(long)]
    pub(crate) unread: bool,
}

/// Print stored submissions. Read-only: a missing data directory is reported, never created.
pub(crate) async fn run_inbox(args: InboxArgs) -> Result<(), AppError> {
    let contacts = ContactStore::open_existing(&args.data_dir)
        .await?
        .newest_first()
        .await?;
    let careers = CareerStore::open_existing(&args.data_dir)
        .await?
        .newest_first()
        .await?;

    print!("{}", render_inbox(&contacts, &careers, args.unread));
    Ok(())
}

fn keep<T: Record>(records: &[T], unread_only: bool) -> Vec<&T> {
    records
        .iter()
        .filter(|record| !unread_only || !record.is_read())
        .collect()
}

fn marker(is_read: bool) -> &'static str {
    if is_read {
        " "
    } else {
        "*"
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

pub(crate) fn render_inbox(
    contacts: &[ContactSubmission],
    careers: &[CareerApplication],
    unread_only: bool,
) -> String {
    let contacts = keep(contacts, unread_only);
    let careers = keep(careers, unread_only);
    let mut out = String::new();

    out.push_str(&format!("Contact messages ({})\n", contacts.len()));
    for contact in contacts {
        out.push_str(&format!(
            "{} {}  {}  {} <{}>\n    {}\n",
            marker(contact.is_read),
            timestamp(contact.created_at),
            contact.id,
            contact.name,
            contact.email,
            contact.message.replace('\n', "\n    "),
        ));
    }

    out.push_str(&format!("\nCareer applications ({})\n", careers.len()));
    for career in careers {
        out.push_str(&format!(
            "{} {}  {}  {} <{}>  {}y {}m  cv: {}\n    {}\n",
            marker(career.is_read),
            timestamp(career.created_at),
            career.id,
            career.name,
            career.email,
            career.experience_years,
            career.experience_months,
            career.cv_file_name,
            career.skills,
        ));
    }

    out
}
