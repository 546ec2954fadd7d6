//! Demo entry point for the ALANN control core

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use alann::term::atom::Atomic;
use alann::term::{Compound, Op, Variable};
use alann::{EventKind, Nar, Parameters, Term, Truth};

fn atom(s: &str) -> Term {
    Term::Atomic(Atomic::new_atom(s))
}

fn inh(a: Term, b: Term) -> Term {
    Term::Compound(Compound::new(Op::Inheritance, vec![a, b]))
}

fn main() {
    println!("ALANN control core demo");
    println!("=======================");

    let nar = Nar::new(Parameters::default()).expect("default parameters are valid");

    let concepts = Arc::new(AtomicU32::new(0));
    let counter = concepts.clone();
    nar.on_event(EventKind::ConceptNew, move |_| {
        counter.fetch_add(1, Ordering::Relaxed);
    });
    nar.on_event(EventKind::Answer, |event| {
        if let alann::Event::Answer { question, answer } = event {
            println!("  answer: {} <- {}", question, answer);
        }
    });

    println!("\nSeeding knowledge...");
    nar.input_judgment(inh(atom("bird"), atom("animal")), Truth::new(1.0, 0.9));
    nar.input_judgment(inh(atom("robin"), atom("bird")), Truth::new(1.0, 0.9));
    nar.input_judgment(inh(atom("cat"), atom("animal")), Truth::new(1.0, 0.9));

    println!("Asking: what is an animal?");
    nar.input_question(inh(
        Term::Variable(Variable::new_query("x")),
        atom("animal"),
    ));

    println!("\nRunning 20 cycles...");
    nar.cycles(20);

    println!("\nFinal state:");
    println!("  Time: {}", nar.now());
    println!("  Concepts created: {}", concepts.load(Ordering::Relaxed));
    println!(
        "  Pending tasks: {}",
        nar.memory().lock().pending_tasks()
    );
}
