//! Type assist session example
//!
//! Types a small Java method keystroke by keystroke, then shows the painted attributes,
//! the gutter and undo in action.

use std::sync::{Arc, Mutex};
use typeassist_core::{
    Attribute, EditMediator, Language, RopeBuffer, TextBuffer, TextSource, UndoAvailability,
};

fn main() {
    println!("=== Type assist session ===\n");

    let mut mediator = EditMediator::new(RopeBuffer::new(""));
    mediator.set_mode(Language::Java).unwrap();

    let notifications = Arc::new(Mutex::new(Vec::<UndoAvailability>::new()));
    let sink = Arc::clone(&notifications);
    mediator.on_undo_availability_changed(move |state| sink.lock().unwrap().push(state));

    // One keystroke at a time, draining follow-ups in between like a host event loop.
    let source = "int twice(int x) {\n/* doubled */\nreturn x * 2;\n}";
    for c in source.chars() {
        let caret = mediator.buffer().caret();
        mediator.insert(caret, &c.to_string()).unwrap();
        mediator.run_deferred().unwrap();
    }

    println!("1. Text:");
    for (number, line) in mediator
        .line_numbers()
        .entries()
        .iter()
        .zip(mediator.buffer().text().lines())
    {
        println!("  {number:>2} | {line}");
    }

    println!("\n2. Styled runs:");
    print_runs(mediator.buffer());

    println!("\n3. Undo:");
    let mut steps = 0;
    while mediator.undo().unwrap() && steps < 3 {
        steps += 1;
        println!("  after undo #{steps}: {:?}", mediator.buffer().text());
    }

    println!("\n4. Undo availability changes:");
    for state in notifications.lock().unwrap().iter() {
        println!("  {state:?}");
    }
}

fn print_runs(buffer: &RopeBuffer) {
    let text: Vec<char> = buffer.text().chars().collect();
    let mut start = 0;
    while start < buffer.len_chars() {
        let attribute = buffer.attribute_at(start);
        let mut end = start + 1;
        while end < buffer.len_chars() && buffer.attribute_at(end) == attribute {
            end += 1;
        }
        if attribute != Attribute::Normal {
            let run: String = text[start..end].iter().collect();
            println!("  {start:>3}..{end:<3} {attribute:?} {run:?}");
        }
        start = end;
    }
}
