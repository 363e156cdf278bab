//! Shared test models and helpers.

#![allow(dead_code, unused_imports)]

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use stateloom::{Reducer, Transition, Vector};

// ============================================================================
// Counter
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Counter {
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CounterAction {
    Increment,
    Decrement,
    Add(i32),
    Reset,
}

pub struct CounterReducer;

impl Reducer for CounterReducer {
    type Model = Counter;
    type Action = CounterAction;

    fn reduce(model: Counter, action: CounterAction) -> Transition<CounterAction, Counter> {
        let value = match action {
            CounterAction::Increment => model.value + 1,
            CounterAction::Decrement => model.value - 1,
            CounterAction::Add(n) => model.value + n,
            CounterAction::Reset => 0,
        };
        Transition::new(Counter { value })
    }
}

// ============================================================================
// Todo list
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Todo {
    pub done: bool,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TodoModel {
    pub name: String,
    pub todos: Vector<Todo>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TodoAction {
    Add(String),
    Toggle(usize),
    Remove(usize),
}

pub fn todo_transition(mut model: TodoModel, action: TodoAction) -> TodoModel {
    match action {
        TodoAction::Add(text) => {
            model.todos = model.todos.push_front(Todo { done: false, text });
        }
        TodoAction::Toggle(index) => {
            model.todos = model.todos.update(index, |todo| Todo {
                done: !todo.done,
                ..todo
            });
        }
        TodoAction::Remove(index) => {
            model.todos = model.todos.remove(index);
        }
    }
    model
}

pub fn todo_model(texts: &[&str]) -> TodoModel {
    TodoModel {
        name: "groceries".to_string(),
        todos: texts
            .iter()
            .map(|text| Todo {
                done: false,
                text: text.to_string(),
            })
            .collect(),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Shared log that closures can append to.
pub type Log<T> = Arc<Mutex<Vec<T>>>;

pub fn log<T>() -> Log<T> {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries<T: Clone>(log: &Log<T>) -> Vec<T> {
    log.lock().clone()
}
