//! File natives over native-pointer handles.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};

use crb_syntax::DiagnosticKind;

use crate::core::{NativePointerInfo, Value};
use crate::errors::RuntimeError;
use crate::runtime::{CallSite, FrameRef, Runtime};

pub static FILE_POINTER_INFO: NativePointerInfo = NativePointerInfo {
    name: "crowbar.lang.file",
};

const STDIN: u32 = 0;
const STDOUT: u32 = 1;
const STDERR: u32 = 2;

enum FileEntry {
    Stdin,
    Stdout,
    Stderr,
    Reader(BufReader<File>),
    Writer(File),
}

/// Open files, indexed by native-pointer handle.
pub(crate) struct FileTable {
    entries: Vec<Option<FileEntry>>,
}

impl FileTable {
    pub(crate) fn new() -> Self {
        Self {
            entries: vec![
                Some(FileEntry::Stdin),
                Some(FileEntry::Stdout),
                Some(FileEntry::Stderr),
            ],
        }
    }

    fn insert(&mut self, entry: FileEntry) -> u32 {
        if let Some(idx) = self.entries.iter().position(Option::is_none) {
            self.entries[idx] = Some(entry);
            idx as u32
        } else {
            self.entries.push(Some(entry));
            (self.entries.len() - 1) as u32
        }
    }

    fn get_mut(&mut self, handle: u32) -> Option<&mut FileEntry> {
        self.entries.get_mut(handle as usize)?.as_mut()
    }

    /// Standard streams stay open; returns false for unknown handles.
    fn close(&mut self, handle: u32) -> bool {
        let Some(slot) = self.entries.get_mut(handle as usize) else {
            return false;
        };
        match slot {
            Some(FileEntry::Reader(_) | FileEntry::Writer(_)) => {
                *slot = None;
                true
            }
            Some(_) => true,
            None => false,
        }
    }
}

fn file_pointer(handle: u32) -> Value {
    Value::NativePointer {
        info: &FILE_POINTER_INFO,
        handle,
    }
}

fn as_file_handle(v: Value) -> Option<u32> {
    match v {
        Value::NativePointer { info, handle } if std::ptr::eq(info, &FILE_POINTER_INFO) => {
            Some(handle)
        }
        _ => None,
    }
}

/// Define the `STDIN`, `STDOUT` and `STDERR` globals.
pub(crate) fn define_std_streams(rt: &mut Runtime) {
    rt.define_global("STDIN", file_pointer(STDIN));
    rt.define_global("STDOUT", file_pointer(STDOUT));
    rt.define_global("STDERR", file_pointer(STDERR));
}

fn site_error(kind: DiagnosticKind, site: &CallSite) -> RuntimeError {
    RuntimeError::new(kind, &site.file, site.line)
}

/// `fopen(path, mode)`; yields null when the file cannot be opened.
pub fn native_fopen(
    rt: &mut Runtime,
    _frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("fopen", argc, 2, site)?;
    let (Some(path), Some(mode)) = (rt.str_value(rt.arg(argc, 0)), rt.str_value(rt.arg(argc, 1)))
    else {
        return Err(site_error(DiagnosticKind::FopenArgumentType, site));
    };
    let (path, mode) = (path.to_string(), mode.to_string());
    let opened = match mode.as_str() {
        "r" => File::open(&path).map(|f| FileEntry::Reader(BufReader::new(f))),
        "w" => File::create(&path).map(FileEntry::Writer),
        "a" => OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map(FileEntry::Writer),
        _ => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "unsupported open mode",
        )),
    };
    let result = match opened {
        Ok(entry) => file_pointer(rt.files.insert(entry)),
        Err(err) => {
            tracing::debug!(%path, %mode, error = %err, "fopen failed");
            Value::Null
        }
    };
    rt.native_return(argc, result);
    Ok(())
}

pub fn native_fclose(
    rt: &mut Runtime,
    _frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("fclose", argc, 1, site)?;
    let closed = as_file_handle(rt.arg(argc, 0)).is_some_and(|h| rt.files.close(h));
    if !closed {
        return Err(site_error(DiagnosticKind::FcloseArgumentType, site));
    }
    rt.native_return(argc, Value::Null);
    Ok(())
}

/// `fgets(fp)` returns the next line including its newline, or null at end of file.
pub fn native_fgets(
    rt: &mut Runtime,
    _frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("fgets", argc, 1, site)?;
    let handle = as_file_handle(rt.arg(argc, 0));
    let mut line = String::new();
    let read = match handle.and_then(|h| rt.files.get_mut(h)) {
        Some(FileEntry::Stdin) => std::io::stdin().lock().read_line(&mut line),
        Some(FileEntry::Reader(reader)) => reader.read_line(&mut line),
        _ => return Err(site_error(DiagnosticKind::FgetsArgumentType, site)),
    };
    let result = match read {
        Ok(0) => Value::Null,
        Ok(_) => rt.new_string(&line),
        Err(err) => {
            tracing::debug!(error = %err, "fgets failed");
            Value::Null
        }
    };
    rt.native_return(argc, result);
    Ok(())
}

/// `fputs(str, fp)`; text written to `STDOUT` lands in the runtime output.
pub fn native_fputs(
    rt: &mut Runtime,
    _frame: FrameRef,
    argc: usize,
    site: &CallSite,
) -> Result<(), RuntimeError> {
    rt.check_arg_count("fputs", argc, 2, site)?;
    let text = match rt.str_value(rt.arg(argc, 0)) {
        Some(s) => s.to_string(),
        None => return Err(site_error(DiagnosticKind::FputsArgumentType, site)),
    };
    let handle = as_file_handle(rt.arg(argc, 1));
    let written = match handle {
        Some(STDOUT) => {
            rt.write_output(&text);
            Ok(())
        }
        Some(h) => match rt.files.get_mut(h) {
            Some(FileEntry::Stderr) => std::io::stderr().write_all(text.as_bytes()),
            Some(FileEntry::Writer(file)) => file.write_all(text.as_bytes()),
            _ => return Err(site_error(DiagnosticKind::FputsArgumentType, site)),
        },
        None => return Err(site_error(DiagnosticKind::FputsArgumentType, site)),
    };
    if let Err(err) = written {
        tracing::debug!(error = %err, "fputs failed");
    }
    rt.native_return(argc, Value::Null);
    Ok(())
}
