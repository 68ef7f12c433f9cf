use hbnb::console::{Console, CLEAR_SCREEN};
use hbnb::models::Registry;
use hbnb::storage::ObjectStore;
use speculate2::speculate;

/// Run one line and return its trimmed output.
fn run(console: &mut Console, line: &str) -> String {
    let mut out = Vec::new();
    let stop = console.execute(line, &mut out);
    assert!(!stop, "`{}` unexpectedly stopped the console", line);
    String::from_utf8(out).expect("Output is not UTF-8").trim().to_string()
}

fn create(console: &mut Console, class: &str) -> String {
    let id = run(console, &format!("create {}", class));
    assert!(!id.is_empty() && !id.starts_with("**"), "create failed: {}", id);
    id
}

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("file.json");
        let mut store = ObjectStore::open(&path, Registry::builtin())
            .expect("Failed to open store");
        let mut console = Console::new(&mut store);
    }

    describe "control" {
        it "does nothing on blank input" {
            assert_eq!(run(&mut console, ""), "");
            assert_eq!(run(&mut console, "   "), "");
            assert!(!path.exists());
        }

        it "stops on quit and EOF without output" {
            for line in ["quit", "EOF"] {
                let mut out = Vec::new();
                assert!(console.execute(line, &mut out));
                assert!(out.is_empty());
            }
        }

        it "clears the screen only on a terminal" {
            let mut out = Vec::new();
            assert!(!console.execute("cls", &mut out));
            assert!(out.is_empty());

            let mut screen = Console::new(&mut store).interactive(true);
            let mut out = Vec::new();
            assert!(!screen.execute("cls", &mut out));
            assert_eq!(out, CLEAR_SCREEN.as_bytes());
        }

        it "reports unknown verbs" {
            assert_eq!(run(&mut console, "frobnicate User"), "*** Unknown syntax: frobnicate User");
        }

        it "lists help topics" {
            let output = run(&mut console, "help");
            assert!(output.contains("Documented commands (type help <topic>):\n========================================\n"));
            let topics = [
                "EOF", "all", "cls", "count", "create", "destroy", "help", "quit", "show", "update",
            ];
            for topic in topics {
                assert!(output.contains(topic));
                assert!(!run(&mut console, &format!("help {}", topic)).is_empty());
            }
            assert_eq!(run(&mut console, "?"), output);
            assert_eq!(run(&mut console, "help nope"), "*** No help on nope");
        }
    }

    describe "create" {
        it "reports a missing or unknown class" {
            assert_eq!(run(&mut console, "create"), "** class name missing **");
            assert_eq!(run(&mut console, "create xyz"), "** class doesn't exist **");
            assert_eq!(run(&mut console, "xyz.create()"), "** class doesn't exist **");
        }

        it "prints only the new id" {
            let id = create(&mut console, "User");
            assert!(!id.contains(' '));
            assert!(run(&mut console, &format!("show User {}", id)).contains(&id));
        }

        it "works for every model" {
            for class in ["BaseModel", "User", "State", "City", "Amenity", "Place", "Review"] {
                let id = create(&mut console, class);
                let shown = run(&mut console, &format!("show {} {}", class, id));
                assert!(shown.starts_with(&format!("[{}] ({})", class, id)));
            }
        }

        it "supports dot notation" {
            let id = run(&mut console, "City.create()");
            assert!(console.store().get("City", &id).is_some());
        }
    }

    describe "show" {
        it "checks arguments in order" {
            assert_eq!(run(&mut console, "show"), "** class name missing **");
            assert_eq!(run(&mut console, "show xyz"), "** class doesn't exist **");
            assert_eq!(run(&mut console, "show xyz 1234"), "** class doesn't exist **");
            assert_eq!(run(&mut console, "show User"), "** instance id missing **");
            assert_eq!(run(&mut console, "show User 1234"), "** no instance found **");
        }

        it "renders the string form" {
            let id = create(&mut console, "User");
            let output = run(&mut console, &format!("show User {}", id));
            assert!(output.starts_with(&format!("[User] ({}) {{'id': '{}', 'created_at': '", id, id)));
            assert!(output.contains("'updated_at': '"));
            assert!(output.ends_with('}'));
        }

        it "gives the same output in both syntaxes" {
            let id = create(&mut console, "City");
            let verb_first = run(&mut console, &format!("show City {}", id));
            let dotted = run(&mut console, &format!("City.show(\"{}\")", id));
            assert_eq!(verb_first, dotted);
        }

        it "does not find an instance under another class" {
            let id = create(&mut console, "City");
            assert_eq!(run(&mut console, &format!("show State {}", id)), "** no instance found **");
        }
    }

    describe "destroy" {
        it "checks arguments in order" {
            assert_eq!(run(&mut console, "destroy"), "** class name missing **");
            assert_eq!(run(&mut console, "destroy xyz"), "** class doesn't exist **");
            assert_eq!(run(&mut console, "destroy User"), "** instance id missing **");
            assert_eq!(run(&mut console, "destroy User 1234"), "** no instance found **");
        }

        it "removes the instance silently" {
            let id = create(&mut console, "User");
            assert_eq!(run(&mut console, &format!("destroy User {}", id)), "");
            assert_eq!(run(&mut console, &format!("show User {}", id)), "** no instance found **");
        }

        it "reports not found the second time" {
            let id = create(&mut console, "Place");
            assert_eq!(run(&mut console, &format!("destroy Place {}", id)), "");
            assert_eq!(run(&mut console, &format!("destroy Place {}", id)), "** no instance found **");
        }

        it "supports dot notation" {
            let id = create(&mut console, "Review");
            assert_eq!(run(&mut console, &format!("Review.destroy(\"{}\")", id)), "");
            assert_eq!(console.store().count(Some("Review")), 0);
        }
    }

    describe "all" {
        it "prints an empty list with no objects" {
            assert_eq!(run(&mut console, "all"), "[]");
            assert_eq!(run(&mut console, "all User"), "[]");
        }

        it "rejects an unknown class" {
            assert_eq!(run(&mut console, "all xyz"), "** class doesn't exist **");
            assert_eq!(run(&mut console, "xyz.all()"), "** class doesn't exist **");
        }

        it "lists every object on one line" {
            let city = create(&mut console, "City");
            let user = create(&mut console, "User");

            let output = run(&mut console, "all");
            assert!(output.starts_with('[') && output.ends_with(']'));
            assert!(!output.contains('\n'));
            assert!(output.contains(&city));
            assert!(output.contains(&user));
        }

        it "filters by class in both syntaxes" {
            let city = create(&mut console, "City");
            let users: Vec<String> = (0..3).map(|_| create(&mut console, "User")).collect();

            for line in ["all User", "User.all()"] {
                let output = run(&mut console, line);
                for id in &users {
                    assert!(output.contains(id.as_str()));
                }
                assert!(!output.contains(&city));
            }
        }
    }

    describe "count" {
        it "checks arguments" {
            assert_eq!(run(&mut console, "count"), "** class name missing **");
            assert_eq!(run(&mut console, "count xyz"), "** class doesn't exist **");
        }

        it "tracks creates and destroys" {
            assert_eq!(run(&mut console, "count User"), "0");
            let ids: Vec<String> = (0..3).map(|_| create(&mut console, "User")).collect();
            create(&mut console, "City");

            assert_eq!(run(&mut console, "count User"), "3");
            assert_eq!(run(&mut console, "User.count()"), "3");

            run(&mut console, &format!("destroy User {}", ids[0]));
            assert_eq!(run(&mut console, "count User"), "2");
            assert_eq!(
                run(&mut console, "count User"),
                console.store().all(Some("User")).len().to_string()
            );
        }
    }

    describe "update" {
        it "checks arguments in order" {
            assert_eq!(run(&mut console, "update"), "** class name missing **");
            assert_eq!(run(&mut console, "update xyz"), "** class doesn't exist **");
            assert_eq!(run(&mut console, "update User"), "** instance id missing **");
            assert_eq!(run(&mut console, "update User 1234"), "** no instance found **");

            let id = create(&mut console, "User");
            assert!(run(&mut console, &format!("update User {}", id)).contains("attribute name missing"));
            assert!(run(&mut console, &format!("update User {} email", id)).contains("value missing"));
        }

        it "sets a quoted string" {
            let id = create(&mut console, "User");
            assert_eq!(run(&mut console, &format!("update User {} email \"a@b.com\"", id)), "");
            assert!(run(&mut console, &format!("show User {}", id)).contains("'email': 'a@b.com'"));
        }

        it "keeps spaces inside quoted values" {
            let id = create(&mut console, "User");
            run(&mut console, &format!("update User {} first_name \"Betty Holberton\"", id));
            assert!(run(&mut console, &format!("show User {}", id)).contains("'first_name': 'Betty Holberton'"));
        }

        it "coerces bare numbers" {
            let id = create(&mut console, "Place");
            run(&mut console, &format!("update Place {} number_rooms 4", id));
            run(&mut console, &format!("update Place {} latitude 37.77", id));
            let output = run(&mut console, &format!("show Place {}", id));
            assert!(output.contains("'number_rooms': 4"));
            assert!(output.contains("'latitude': 37.77"));
        }

        it "accepts dot notation with a key and value" {
            let id = create(&mut console, "User");
            assert_eq!(run(&mut console, &format!("User.update(\"{}\", \"age\", 36)", id)), "");
            assert!(run(&mut console, &format!("show User {}", id)).contains("'age': 36"));
        }

        it "applies a dictionary in order" {
            let id = create(&mut console, "User");
            let line = format!("User.update(\"{}\", {{\"age\": 36, \"name\": \"Sam\"}})", id);
            assert_eq!(run(&mut console, &line), "");

            let output = run(&mut console, &format!("show User {}", id));
            assert!(output.contains("'age': 36"));
            assert!(output.contains("'name': 'Sam'"));
            let age = output.find("'age'").expect("age");
            let name = output.find("'name'").expect("name");
            assert!(age < name);
        }

        it "accepts single-quoted dictionary keys" {
            let id = create(&mut console, "User");
            run(&mut console, &format!("User.update('{}', {{'name': 'Michael'}})", id));
            assert!(run(&mut console, &format!("show User {}", id)).contains("'name': 'Michael'"));
        }

        it "refuses reserved attributes without partial writes" {
            let id = create(&mut console, "User");
            let line = format!("User.update(\"{}\", {{\"name\": \"Sam\", \"id\": \"other\"}})", id);
            assert_eq!(run(&mut console, &line), "** attribute id is read-only **");

            let output = run(&mut console, &format!("show User {}", id));
            assert!(!output.contains("'name'"));
            assert!(output.contains(&format!("'id': '{}'", id)));

            assert_eq!(
                run(&mut console, &format!("update User {} created_at now", id)),
                "** attribute created_at is read-only **"
            );
        }

        it "leaves the object untouched when the save fails" {
            let id = create(&mut console, "User");
            std::fs::create_dir(path.with_file_name("file.json.tmp"))
                .expect("Failed to create blocker");

            let line = format!("User.update(\"{}\", {{\"age\": 36, \"name\": \"Sam\"}})", id);
            assert!(run(&mut console, &line).starts_with("** unable to save: "));
            let output = run(&mut console, &format!("show User {}", id));
            assert!(!output.contains("'age'"));
            assert!(!output.contains("'name'"));

            assert!(run(&mut console, "create City").starts_with("** unable to save: "));
            assert_eq!(run(&mut console, "count City"), "0");
        }

        it "persists every write" {
            let id = create(&mut console, "User");
            run(&mut console, &format!("update User {} email \"a@b.com\"", id));

            let reloaded = ObjectStore::open(&path, Registry::builtin()).expect("Failed to reopen");
            let live: Vec<_> = console.store().all(None);
            assert_eq!(reloaded.all(None), live);
        }
    }

    describe "syntax errors" {
        it "reports malformed dot notation with the original line" {
            for line in [
                "User.all",
                "User.show(some_id)",
                "User.fly()",
                "User.update({\"a\": 1})",
                "User.show(\"unterminated)",
            ] {
                assert_eq!(run(&mut console, line), format!("*** Unknown syntax: {}", line));
            }
        }

        it "does not mutate on a syntax error" {
            run(&mut console, "User.create(oops)");
            assert_eq!(console.store().count(None), 0);
        }
    }

    describe "example scenarios" {
        it "round-trips create, update, show and destroy" {
            let id = create(&mut console, "User");
            assert!(run(&mut console, &format!("show User {}", id)).contains(&id));

            run(&mut console, &format!("update User {} email \"a@b.com\"", id));
            assert!(run(&mut console, &format!("show User {}", id)).contains("'email': 'a@b.com'"));

            run(&mut console, &format!("User.update(\"{}\", {{\"age\": 36, \"name\": \"Sam\"}})", id));
            let output = run(&mut console, &format!("show User {}", id));
            assert!(output.contains("'age': 36"));
            assert!(output.contains("'name': 'Sam'"));

            run(&mut console, &format!("destroy User {}", id));
            assert_eq!(run(&mut console, &format!("show User {}", id)), "** no instance found **");
            assert_eq!(run(&mut console, "count xyz"), "** class doesn't exist **");
            assert_eq!(run(&mut console, "all"), "[]");
        }
    }
}
