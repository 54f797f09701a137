use anyhow::Result;
use std::io::{self, Write}; // For input/output
use tenpair_solver::engine::{Action, GameConfig, GameState};

fn main() -> Result<()> {
    let config = GameConfig::default();
    let mut game = GameState::new_random(&config); // Fresh random deal
    let mut undo_stack: Vec<GameState> = Vec::new();

    println!("Welcome to TenPair!");
    println!("Match two digits that are equal or sum to 10, with only cleared");
    println!("cells between them along a row, column, diagonal, or across a");
    println!("row boundary in reading order.");

    loop {
        println!("---------------------");
        println!(
            "Actions: {}, Refreshes left: {}, Digits left: {}",
            game.actions_taken(),
            game.refresh_budget(),
            game.board().digit_count()
        );
        println!("{}", game.board()); // Display the board

        if game.is_won() {
            println!();
            println!("---------------------");
            println!("🎉 BOARD CLEARED! 🎉");
            println!("Total actions: {}", game.actions_taken());
            println!("---------------------");
            break;
        }

        print!("Enter a match (r1 c1 r2 c2), 'a' to add digits, 'u' to undo, 'q' to quit: ");
        io::stdout().flush()?; // Ensure prompt is shown before input

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Error reading input. Please try again.");
            continue;
        }

        let trimmed_input = input.trim();

        if trimmed_input == "q" {
            println!("Thanks for playing!");
            break;
        }

        if trimmed_input == "u" {
            match undo_stack.pop() {
                Some(previous) => {
                    game = previous;
                    println!("Action undone.");
                }
                None => println!("Cannot undo further (already at the initial deal)."),
            }
            continue;
        }

        if trimmed_input == "a" {
            let snapshot = game.clone();
            match game.apply_action(Action::Refresh) {
                Ok(()) => {
                    undo_stack.push(snapshot);
                    println!("Remaining digits appended to the board.");
                }
                Err(err) => println!("Cannot add digits: {}.", err),
            }
            continue;
        }

        // Try to parse as a pair of coordinates
        let parts: Vec<&str> = trimmed_input.split_whitespace().collect();
        if parts.len() == 4 {
            let coords: Vec<usize> = parts.iter().filter_map(|p| p.parse().ok()).collect();
            if coords.len() == 4 {
                let action = Action::Match((coords[0], coords[1]), (coords[2], coords[3]));
                let snapshot = game.clone();
                match game.apply_action(action) {
                    Ok(()) => {
                        undo_stack.push(snapshot);
                        println!("Match taken.");
                    }
                    Err(_) => println!(
                        "Invalid move: ({}, {}) and ({}, {}) are not a visible \
                         matching pair.",
                        coords[0], coords[1], coords[2], coords[3]
                    ),
                }
            } else {
                println!(
                    "Invalid input: Please enter numbers for both positions \
                     (e.g., '0 3 1 3'), 'a', 'u', or 'q'."
                );
            }
        } else {
            println!("Invalid input format. Use 'r1 c1 r2 c2', 'a', 'u', or 'q'.");
        }
    }
    Ok(())
}
