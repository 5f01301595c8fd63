use std::rc::Rc;

use tracing::debug;

use crate::ast::{BlockStatement, Expression, Identifier, Program, Statement};
use crate::builtins;
use crate::env::{Env, Environment};
use crate::object::{Function, HashObject, Object, ObjectType, NULL};

/// Evaluates a whole program. A `return` at top level ends the program with
/// its value; the first error ends it with that error.
pub fn eval(program: &Program, env: &Env) -> Object {
    let mut result = NULL;

    for statement in &program.statements {
        result = eval_statement(statement, env);

        if let Object::ReturnValue(value) = result {
            return *value;
        }
        if result.is_error() {
            return result;
        }
    }

    result
}

// Unlike `eval`, hands `ReturnValue` back still wrapped so enclosing blocks
// stop too and the call frame can unwrap it.
fn eval_block_statement(block: &BlockStatement, env: &Env) -> Object {
    let mut result = NULL;

    for statement in &block.statements {
        result = eval_statement(statement, env);

        if matches!(result, Object::ReturnValue(_) | Object::Error(_)) {
            return result;
        }
    }

    result
}

fn eval_statement(stmt: &Statement, env: &Env) -> Object {
    match stmt {
        Statement::Expression(expression) => eval_expression(expression, env),
        Statement::Block(block) => eval_block_statement(block, env),
        Statement::Return(None) => Object::ReturnValue(Box::new(NULL)),
        Statement::Return(Some(value)) => {
            let val = eval_expression(value, env);
            if val.is_error() {
                return val;
            }
            Object::ReturnValue(Box::new(val))
        }
        Statement::Let { name, value } => {
            let val = eval_expression(value, env);
            if val.is_error() {
                return val;
            }
            env.borrow_mut().set(name.value.as_str(), val.clone());
            val
        }
    }
}

fn eval_expression(expr: &Expression, env: &Env) -> Object {
    match expr {
        Expression::IntegerLiteral(value) => Object::Integer(*value),
        Expression::BooleanLiteral(value) => Object::from_bool(*value),
        Expression::StringLiteral(value) => Object::String(value.clone()),
        Expression::Identifier(identifier) => eval_identifier(identifier, env),
        Expression::Prefix { operator, right } => {
            let right = eval_expression(right, env);
            if right.is_error() {
                return right;
            }
            eval_prefix_expression(operator, right)
        }
        Expression::Infix { operator, left, right } => {
            let left = eval_expression(left, env);
            if left.is_error() {
                return left;
            }
            let right = eval_expression(right, env);
            if right.is_error() {
                return right;
            }
            eval_infix_expression(operator, left, right)
        }
        Expression::If { condition, consequence, alternative } => {
            eval_if_expression(condition, consequence, alternative.as_ref(), env)
        }
        Expression::FunctionLiteral { parameters, body } => Object::Function(Rc::new(Function {
            parameters: Rc::clone(parameters),
            body: Rc::clone(body),
            env: Rc::clone(env),
        })),
        Expression::Call { function, arguments } => {
            let func = eval_expression(function, env);
            if func.is_error() {
                return func;
            }
            match eval_expressions(arguments, env) {
                Ok(args) => apply_function(func, args),
                Err(err) => err,
            }
        }
        Expression::ArrayLiteral(elements) => match eval_expressions(elements, env) {
            Ok(elements) => Object::Array(Rc::new(elements)),
            Err(err) => err,
        },
        Expression::HashLiteral(pairs) => eval_hash_literal(pairs, env),
        Expression::Index { left, index } => {
            let left = eval_expression(left, env);
            if left.is_error() {
                return left;
            }
            let index = eval_expression(index, env);
            if index.is_error() {
                return index;
            }
            eval_index_expression(left, index)
        }
    }
}

/// Evaluates left to right, stopping at the first error.
fn eval_expressions(exprs: &[Expression], env: &Env) -> Result<Vec<Object>, Object> {
    exprs
        .iter()
        .map(|expr| {
            let evaluated = eval_expression(expr, env);
            if evaluated.is_error() {
                Err(evaluated)
            } else {
                Ok(evaluated)
            }
        })
        .collect()
}

fn eval_prefix_expression(operator: &str, right: Object) -> Object {
    match operator {
        "!" => eval_bang_operator_expression(right),
        "-" => eval_minus_prefix_operator_expression(right),
        _ => Object::error(format!("unknown operator: {}{}", operator, right.object_type())),
    }
}

fn eval_bang_operator_expression(right: Object) -> Object {
    Object::from_bool(!right.is_truthy())
}

fn eval_minus_prefix_operator_expression(right: Object) -> Object {
    match right {
        Object::Integer(value) => Object::Integer(value.wrapping_neg()),
        other => Object::error(format!("unknown operator: -{}", other.object_type())),
    }
}

fn eval_infix_expression(operator: &str, left: Object, right: Object) -> Object {
    if left.object_type() != right.object_type() {
        return Object::error(format!(
            "type mismatch: {} {} {}",
            left.object_type(),
            operator,
            right.object_type()
        ));
    }

    match (operator, &left, &right) {
        ("==", _, _) => Object::from_bool(left == right),
        ("!=", _, _) => Object::from_bool(left != right),
        (_, Object::Integer(l), Object::Integer(r)) => eval_integer_infix_expression(operator, *l, *r),
        ("+", Object::String(l), Object::String(r)) => Object::String(format!("{}{}", l, r)),
        _ => Object::error(format!(
            "unknown operator: {} {} {}",
            left.object_type(),
            operator,
            right.object_type()
        )),
    }
}

fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> Object {
    match operator {
        "+" => Object::Integer(left.wrapping_add(right)),
        "-" => Object::Integer(left.wrapping_sub(right)),
        "*" => Object::Integer(left.wrapping_mul(right)),
        "/" if right == 0 => Object::error("division by zero"),
        "/" => Object::Integer(left.wrapping_div(right)),
        "<" => Object::from_bool(left < right),
        ">" => Object::from_bool(left > right),
        _ => Object::error(format!("unknown operator: {0} {1} {0}", ObjectType::Integer, operator)),
    }
}

fn eval_if_expression(
    condition: &Expression,
    consequence: &BlockStatement,
    alternative: Option<&BlockStatement>,
    env: &Env,
) -> Object {
    let condition = eval_expression(condition, env);
    if condition.is_error() {
        return condition;
    }

    if condition.is_truthy() {
        eval_block_statement(consequence, env)
    } else if let Some(alternative) = alternative {
        eval_block_statement(alternative, env)
    } else {
        NULL
    }
}

fn eval_identifier(node: &Identifier, env: &Env) -> Object {
    if let Some(val) = env.borrow().get(&node.value) {
        return val;
    }

    if let Some(builtin) = builtins::lookup(&node.value) {
        return builtin;
    }

    Object::error(format!("identifier not found: {}", node.value))
}

fn apply_function(func: Object, args: Vec<Object>) -> Object {
    match func {
        Object::Function(func) => {
            debug!(params = func.parameters.len(), args = args.len(), "calling function");
            let extended_env = extend_function_env(&func, args);
            let evaluated = eval_block_statement(&func.body, &extended_env);
            unwrap_return_value(evaluated)
        }
        Object::Builtin(builtin) => {
            debug!(name = builtin.name, args = args.len(), "calling builtin");
            builtin.call(args)
        }
        other => Object::error(format!("not a function: {}", other.object_type())),
    }
}

// Missing arguments bind to null; extra ones are dropped.
fn extend_function_env(func: &Function, args: Vec<Object>) -> Env {
    let env = Environment::new_enclosed(&func.env);

    if args.len() > func.parameters.len() {
        debug!(
            expected = func.parameters.len(),
            got = args.len(),
            "ignoring extra call arguments"
        );
    }

    let mut args = args.into_iter();
    {
        let mut frame = env.borrow_mut();
        for param in func.parameters.iter() {
            frame.set(param.value.as_str(), args.next().unwrap_or(NULL));
        }
    }

    env
}

fn unwrap_return_value(obj: Object) -> Object {
    match obj {
        Object::ReturnValue(value) => *value,
        other => other,
    }
}

fn eval_index_expression(left: Object, index: Object) -> Object {
    match (&left, &index) {
        (Object::Array(elements), Object::Integer(idx)) => eval_array_index_expression(elements, *idx),
        (Object::Hash(hash), _) => eval_hash_index_expression(hash, &index),
        _ => Object::error(format!("index operator not supported: {}", left.object_type())),
    }
}

fn eval_array_index_expression(elements: &[Object], idx: i64) -> Object {
    usize::try_from(idx)
        .ok()
        .and_then(|idx| elements.get(idx))
        .cloned()
        .unwrap_or(NULL)
}

fn eval_hash_index_expression(hash: &HashObject, index: &Object) -> Object {
    match index.hash_key() {
        Some(key) => hash.get(&key).cloned().unwrap_or(NULL),
        None => Object::error(format!("unusable as hash key: {}", index.object_type())),
    }
}

fn eval_hash_literal(pairs: &[(Expression, Expression)], env: &Env) -> Object {
    let mut hash = HashObject::new();

    for (key_node, value_node) in pairs {
        let key = eval_expression(key_node, env);
        if key.is_error() {
            return key;
        }

        let Some(hash_key) = key.hash_key() else {
            return Object::error(format!("unusable as hash key: {}", key.object_type()));
        };

        let value = eval_expression(value_node, env);
        if value.is_error() {
            return value;
        }

        hash.insert(hash_key, key, value);
    }

    Object::Hash(Rc::new(hash))
}
