use std::io::{self, Write};
use std::rc::Rc;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::object::{BuiltinFunction, Object, NULL};

lazy_static! {
    pub static ref BUILTINS: FxHashMap<&'static str, BuiltinFunction> = {
        let mut m = FxHashMap::default();
        for builtin in [
            BuiltinFunction::new("len", len),
            BuiltinFunction::new("first", first),
            BuiltinFunction::new("last", last),
            BuiltinFunction::new("rest", rest),
            BuiltinFunction::new("push", push),
            BuiltinFunction::new("puts", puts),
        ] {
            m.insert(builtin.name, builtin);
        }
        m
    };
}

/// Returns the builtin bound to `name`, if there is one.
pub fn lookup(name: &str) -> Option<Object> {
    BUILTINS.get(name).map(|builtin| Object::Builtin(*builtin))
}

fn wrong_arg_count(got: usize, want: usize) -> Object {
    Object::error(format!("wrong number of arguments. got={}, want={}", got, want))
}

fn must_be_array(name: &str, got: &Object) -> Object {
    Object::error(format!("argument to `{}` must be ARRAY, got {}", name, got.object_type()))
}

fn len(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }

    match &args[0] {
        Object::String(s) => Object::Integer(s.chars().count() as i64),
        Object::Array(elements) => Object::Integer(elements.len() as i64),
        Object::Hash(hash) => Object::Integer(hash.len() as i64),
        other => Object::error(format!("argument to `len` not supported, got {}", other.object_type())),
    }
}

fn first(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }

    match &args[0] {
        Object::Array(elements) => elements.first().cloned().unwrap_or(NULL),
        other => must_be_array("first", other),
    }
}

fn last(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }

    match &args[0] {
        Object::Array(elements) => elements.last().cloned().unwrap_or(NULL),
        other => must_be_array("last", other),
    }
}

fn rest(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }

    match &args[0] {
        Object::Array(elements) if elements.is_empty() => NULL,
        Object::Array(elements) => Object::Array(Rc::new(elements[1..].to_vec())),
        other => must_be_array("rest", other),
    }
}

fn push(args: Vec<Object>) -> Object {
    if args.len() != 2 {
        return wrong_arg_count(args.len(), 2);
    }

    match &args[0] {
        Object::Array(elements) => {
            let mut new_elements = Vec::with_capacity(elements.len() + 1);
            new_elements.extend(elements.iter().cloned());
            new_elements.push(args[1].clone());
            Object::Array(Rc::new(new_elements))
        }
        other => must_be_array("push", other),
    }
}

fn puts(args: Vec<Object>) -> Object {
    let mut stdout = io::stdout().lock();
    if let Err(err) = write_lines(&mut stdout, &args) {
        warn!(error = %err, "puts could not write to stdout");
    }
    NULL
}

fn write_lines<W: Write>(output: &mut W, args: &[Object]) -> io::Result<()> {
    for arg in args {
        writeln!(output, "{}", arg)?;
    }
    output.flush()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ints(values: &[i64]) -> Object {
        Object::Array(Rc::new(values.iter().map(|&v| Object::Integer(v)).collect()))
    }

    fn call(name: &str, args: Vec<Object>) -> Object {
        match lookup(name) {
            Some(Object::Builtin(builtin)) => builtin.call(args),
            other => panic!("no builtin named {}. got={:?}", name, other),
        }
    }

    #[test]
    fn test_table_has_every_builtin() {
        let mut names: Vec<&str> = BUILTINS.keys().copied().collect();
        names.sort();
        assert_eq!(names, vec!["first", "last", "len", "push", "puts", "rest"]);
        assert!(lookup("print").is_none());
    }

    #[test]
    fn test_len() {
        assert_eq!(call("len", vec![Object::String(String::new())]), Object::Integer(0));
        assert_eq!(call("len", vec![Object::String("héllo".to_string())]), Object::Integer(5));
        assert_eq!(call("len", vec![ints(&[1, 2, 3])]), Object::Integer(3));
        assert_eq!(
            call("len", vec![Object::Integer(1)]),
            Object::error("argument to `len` not supported, got integer")
        );
        assert_eq!(call("len", vec![]), Object::error("wrong number of arguments. got=0, want=1"));
    }

    #[test]
    fn test_array_accessors() {
        assert_eq!(call("first", vec![ints(&[1, 2, 3])]), Object::Integer(1));
        assert_eq!(call("first", vec![ints(&[])]), NULL);
        assert_eq!(call("last", vec![ints(&[1, 2, 3])]), Object::Integer(3));
        assert_eq!(call("last", vec![ints(&[])]), NULL);
        assert_eq!(call("rest", vec![ints(&[1, 2, 3])]), ints(&[2, 3]));
        assert_eq!(call("rest", vec![ints(&[1])]), ints(&[]));
        assert_eq!(call("rest", vec![ints(&[])]), NULL);
        assert_eq!(
            call("first", vec![Object::Integer(1)]),
            Object::error("argument to `first` must be ARRAY, got integer")
        );
        assert_eq!(
            call("rest", vec![Object::String("abc".to_string())]),
            Object::error("argument to `rest` must be ARRAY, got string")
        );
    }

    #[test]
    fn test_push_leaves_original_untouched() {
        let original = ints(&[1, 2]);
        assert_eq!(call("push", vec![original.clone(), Object::Integer(3)]), ints(&[1, 2, 3]));
        assert_eq!(original, ints(&[1, 2]));

        assert_eq!(call("push", vec![ints(&[])]), Object::error("wrong number of arguments. got=1, want=2"));
        assert_eq!(
            call("push", vec![Object::Integer(1), Object::Integer(1)]),
            Object::error("argument to `push` must be ARRAY, got integer")
        );
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_lines_puts_each_value_on_its_own_line() {
        let mut output = Vec::new();
        write_lines(&mut output, &[Object::Integer(1), Object::String("two".to_string()), ints(&[3])]).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "1\ntwo\n[3]\n");
    }

    #[test]
    fn test_write_lines_reports_a_closed_stream() {
        let err = write_lines(&mut ClosedPipe, &[Object::Integer(1)]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_puts_returns_null() {
        assert_eq!(call("puts", vec![Object::Integer(1), Object::String("two".to_string())]), NULL);
        assert_eq!(call("puts", vec![]), NULL);
    }
}
