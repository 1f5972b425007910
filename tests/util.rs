//! Shared test utilities for integration tests
//!
//! Builds a working directory with a config file and an input directory,
//! the layout the binary expects when run from that directory.

#![allow(dead_code)]

use assert_fs::prelude::*;

/// Sample quoted mail used across tests.
pub const QUOTED_MAIL: &str = "> これは引用されたメールです。\n\
                               > 複数行にわたる　内容が　含まれています。\n\
                               > 句点があります。次の文章が続きます。\n";

/// Expected cleaned form of [`QUOTED_MAIL`] with no keywords configured.
pub const QUOTED_MAIL_CLEANED: &str = "これは引用されたメールです。\n\
                                       複数行にわたる\n\
                                       内容が\n\
                                       含まれています。\n\
                                       句点があります。\n\
                                       次の文章が続きます。";

/// Write a config.ini pointing at `input`/`output` inside the fixture.
pub fn write_config(
    tmp: &assert_fs::TempDir,
    encoding: &str,
    backup: bool,
    keywords: &str,
)
{
    let body = format!(
        "[paths]\ninput_dir = input\noutput_dir = output\n\n\
         [processing]\nencoding = {encoding}\nbackup_original = {backup}\n\n\
         [keywords]\nlist = {keywords}\n"
    );

    tmp.child("config.ini")
        .write_str(&body)
        .expect("write config");
}

/// A fixture with three inputs, one of which is not valid UTF-8.
pub fn make_batch_fixture() -> assert_fs::TempDir
{
    // Initialize the temporary working directory
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    write_config(&tmp, "utf-8", true, "件名,宛先");

    tmp.child("input/first.txt")
        .write_str(QUOTED_MAIL)
        .expect("write first");

    // Lone continuation bytes are never valid UTF-8
    tmp.child("input/second.txt")
        .write_binary(&[0x3e, 0x20, 0x80, 0x81, 0xfe])
        .expect("write second");

    tmp.child("input/third.txt")
        .write_str(">> お世話になります。\n>> 件名：打ち合わせ\n>> 宛先：営業部\n")
        .expect("write third");

    // Not an input: wrong extension
    tmp.child("input/notes.md")
        .write_str("> ignored\n")
        .expect("write notes");

    tmp
}
