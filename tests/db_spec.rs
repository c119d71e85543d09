use speculate2::speculate;
use superheroes::db::Database;
use superheroes::error::Error;
use superheroes::models::*;

fn create_test_hero(db: &Database, name: &str) -> Hero {
    db.create_hero(CreateHeroInput {
        name: Some(name.to_string()),
        super_name: None,
    })
    .expect("Failed to create hero")
}

fn create_test_power(db: &Database, name: &str) -> Power {
    db.create_power(CreatePowerInput {
        name: Some(name.to_string()),
        description: Some("Gives super strength".to_string()),
    })
    .expect("Failed to create power")
}

fn link(db: &Database, hero: &Hero, power: &Power, strength: &str) -> HeroPower {
    db.create_hero_power(CreateHeroPowerInput {
        hero_id: Some(hero.id),
        power_id: Some(power.id),
        strength: Some(strength.to_string()),
    })
    .expect("Failed to create hero power")
    .hero_power
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "heroes" {
        describe "create_hero" {
            it "creates a hero with all fields" {
                let hero = db.create_hero(CreateHeroInput {
                    name: Some("Kamala Khan".to_string()),
                    super_name: Some("Ms. Marvel".to_string()),
                }).expect("Failed to create hero");

                assert!(hero.id > 0);
                assert_eq!(hero.name, Some("Kamala Khan".to_string()));
                assert_eq!(hero.super_name, Some("Ms. Marvel".to_string()));
            }

            it "creates a hero with no fields" {
                let hero = db.create_hero(CreateHeroInput::default()).expect("Failed to create hero");

                assert!(hero.name.is_none());
                assert!(hero.super_name.is_none());
            }

            it "assigns distinct ids" {
                let a = create_test_hero(&db, "A");
                let b = create_test_hero(&db, "B");
                assert_ne!(a.id, b.id);
            }
        }

        describe "get_hero" {
            it "returns None for non-existent hero" {
                assert!(db.get_hero(404).expect("Query failed").is_none());
            }

            it "returns the hero by id" {
                let created = create_test_hero(&db, "Doreen Green");
                let found = db.get_hero(created.id).expect("Query failed");
                assert_eq!(found, Some(created));
            }
        }

        describe "get_all_heroes" {
            it "returns empty list when no heroes exist" {
                assert!(db.get_all_heroes().expect("Query failed").is_empty());
            }

            it "returns heroes in creation order" {
                create_test_hero(&db, "Zebra");
                create_test_hero(&db, "Alpha");

                let heroes = db.get_all_heroes().expect("Query failed");
                assert_eq!(heroes.len(), 2);
                assert_eq!(heroes[0].name.as_deref(), Some("Zebra"));
                assert_eq!(heroes[1].name.as_deref(), Some("Alpha"));
            }
        }

        describe "update_hero" {
            it "updates only the given fields" {
                let hero = db.create_hero(CreateHeroInput {
                    name: Some("Gwen Stacy".to_string()),
                    super_name: Some("Spider-Woman".to_string()),
                }).expect("Failed to create hero");

                let updated = db.update_hero(hero.id, UpdateHeroInput {
                    name: None,
                    super_name: Some("Spider-Gwen".to_string()),
                }).expect("Update failed").expect("Hero missing");

                assert_eq!(updated.name, Some("Gwen Stacy".to_string()));
                assert_eq!(updated.super_name, Some("Spider-Gwen".to_string()));
                assert_eq!(db.get_hero(hero.id).expect("Query failed"), Some(updated));
            }

            it "returns None for non-existent hero" {
                let result = db.update_hero(404, UpdateHeroInput::default()).expect("Update failed");
                assert!(result.is_none());
            }
        }

        describe "delete_hero" {
            it "returns false for non-existent hero" {
                assert!(!db.delete_hero(404).expect("Delete failed"));
            }

            it "deletes the hero and cascades to its hero powers" {
                let hero = create_test_hero(&db, "Carol Danvers");
                let strength = create_test_power(&db, "super strength");
                let flight = create_test_power(&db, "flight");
                link(&db, &hero, &strength, "Strong");
                link(&db, &hero, &flight, "Strong");

                assert!(db.delete_hero(hero.id).expect("Delete failed"));

                assert!(db.get_hero(hero.id).expect("Query failed").is_none());
                assert!(db.get_all_hero_powers().expect("Query failed").is_empty());
                assert_eq!(db.get_all_powers().expect("Query failed").len(), 2);
            }

            it "leaves other heroes' hero powers alone" {
                let doomed = create_test_hero(&db, "Doomed");
                let survivor = create_test_hero(&db, "Survivor");
                let power = create_test_power(&db, "flight");
                link(&db, &doomed, &power, "Weak");
                let kept = link(&db, &survivor, &power, "Strong");

                db.delete_hero(doomed.id).expect("Delete failed");

                assert_eq!(db.get_all_hero_powers().expect("Query failed"), vec![kept]);
            }
        }

        describe "get_powers_for_hero" {
            it "returns None for non-existent hero" {
                assert!(db.get_powers_for_hero(404).expect("Query failed").is_none());
            }

            it "returns powers in hero power creation order" {
                let hero = create_test_hero(&db, "Ororo Munroe");
                let second = create_test_power(&db, "second");
                let first = create_test_power(&db, "first");
                link(&db, &hero, &first, "Average");
                link(&db, &hero, &second, "Weak");

                let powers = db.get_powers_for_hero(hero.id).expect("Query failed").expect("Hero missing");
                assert_eq!(powers, vec![first, second]);
            }
        }

        describe "add_power_to_hero" {
            it "links the power to the hero" {
                let hero = create_test_hero(&db, "Janet Van Dyne");
                let power = create_test_power(&db, "flight");

                let created = db.add_power_to_hero(hero.id, AddPowerInput {
                    power_id: Some(power.id),
                    strength: Some("Weak".to_string()),
                }).expect("Failed to add power");

                assert_eq!(created.hero_power.hero_id, hero.id);
                assert_eq!(created.hero_power.strength, Strength::Weak);
                assert_eq!(created.power, power);
            }

            it "fails the same way hero power creation does" {
                let hero = create_test_hero(&db, "Janet Van Dyne");
                let power = create_test_power(&db, "flight");

                let err = db.add_power_to_hero(hero.id, AddPowerInput {
                    power_id: Some(power.id),
                    strength: Some("Medium".to_string()),
                }).unwrap_err();

                assert!(matches!(err, Error::Validation(_)));
                assert!(db.get_all_hero_powers().expect("Query failed").is_empty());
            }
        }
    }

    describe "powers" {
        describe "create_power" {
            it "creates a power with a long enough description" {
                let power = db.create_power(CreatePowerInput {
                    name: Some("Super Strength".to_string()),
                    description: Some("Gives super strength".to_string()),
                }).expect("Failed to create power");

                assert_eq!(power.name, Some("Super Strength".to_string()));
                assert_eq!(power.description, "Gives super strength");
                assert_eq!(db.get_power(power.id).expect("Query failed"), Some(power));
            }

            it "accepts a description of exactly twenty characters" {
                let description = "x".repeat(MIN_DESCRIPTION_LEN);
                let result = db.create_power(CreatePowerInput {
                    name: None,
                    description: Some(description),
                });
                assert!(result.is_ok());
            }

            it "rejects a description of nineteen characters" {
                let result = db.create_power(CreatePowerInput {
                    name: None,
                    description: Some("x".repeat(MIN_DESCRIPTION_LEN - 1)),
                });
                assert!(matches!(result, Err(Error::Validation(_))));
            }

            it "rejects a short description without storing anything" {
                let result = db.create_power(CreatePowerInput {
                    name: Some("Tiny".to_string()),
                    description: Some("too short".to_string()),
                });

                assert!(matches!(result, Err(Error::Validation(_))));
                assert!(db.get_all_powers().expect("Query failed").is_empty());
            }

            it "rejects a missing description" {
                let result = db.create_power(CreatePowerInput {
                    name: Some("Nameless".to_string()),
                    description: None,
                });
                assert!(matches!(result, Err(Error::Validation(_))));
            }

            it "rejects an empty description" {
                let result = db.create_power(CreatePowerInput {
                    name: None,
                    description: Some(String::new()),
                });
                assert!(matches!(result, Err(Error::Validation(_))));
            }

            it "stores a long description containing a NUL character" {
                let description = format!("abc\0{}", "x".repeat(30));

                let power = db.create_power(CreatePowerInput {
                    name: None,
                    description: Some(description.clone()),
                }).expect("Failed to create power");

                let stored = db.get_power(power.id).expect("Query failed").expect("Power missing");
                assert_eq!(stored.description, description);
            }
        }

        describe "update_power" {
            it "accepts a valid new description" {
                let power = create_test_power(&db, "flight");

                let updated = db.update_power(power.id, UpdatePowerInput {
                    name: None,
                    description: Some("gives the wielder the ability to fly".to_string()),
                }).expect("Update failed").expect("Power missing");

                assert_eq!(updated.name, Some("flight".to_string()));
                assert_eq!(updated.description, "gives the wielder the ability to fly");
            }

            it "rejects a short description and keeps the old one" {
                let power = create_test_power(&db, "flight");

                let result = db.update_power(power.id, UpdatePowerInput {
                    name: None,
                    description: Some("too short".to_string()),
                });

                assert!(matches!(result, Err(Error::Validation(_))));
                let stored = db.get_power(power.id).expect("Query failed").expect("Power missing");
                assert_eq!(stored.description, power.description);
            }

            it "accepts a long description containing a NUL character" {
                let power = create_test_power(&db, "flight");
                let description = format!("{}\0abc", "y".repeat(25));

                let updated = db.update_power(power.id, UpdatePowerInput {
                    name: None,
                    description: Some(description.clone()),
                }).expect("Update failed").expect("Power missing");

                assert_eq!(updated.description, description);
            }

            it "renames without touching the description" {
                let power = create_test_power(&db, "flight");

                let updated = db.update_power(power.id, UpdatePowerInput {
                    name: Some("soaring".to_string()),
                    description: None,
                }).expect("Update failed").expect("Power missing");

                assert_eq!(updated.name, Some("soaring".to_string()));
                assert_eq!(updated.description, power.description);
            }

            it "returns None for non-existent power" {
                let result = db.update_power(404, UpdatePowerInput::default()).expect("Update failed");
                assert!(result.is_none());
            }
        }

        describe "delete_power" {
            it "deletes the power and cascades to its hero powers" {
                let power = create_test_power(&db, "flight");
                let a = create_test_hero(&db, "A");
                let b = create_test_hero(&db, "B");
                let c = create_test_hero(&db, "C");
                link(&db, &a, &power, "Strong");
                link(&db, &b, &power, "Weak");
                link(&db, &c, &power, "Average");

                assert!(db.delete_power(power.id).expect("Delete failed"));

                assert!(db.get_power(power.id).expect("Query failed").is_none());
                assert!(db.get_all_hero_powers().expect("Query failed").is_empty());
                assert_eq!(db.get_all_heroes().expect("Query failed").len(), 3);
            }

            it "returns false for non-existent power" {
                assert!(!db.delete_power(404).expect("Delete failed"));
            }
        }

        describe "get_heroes_for_power" {
            it "returns None for non-existent power" {
                assert!(db.get_heroes_for_power(404).expect("Query failed").is_none());
            }

            it "returns each linked hero" {
                let power = create_test_power(&db, "flight");
                let a = create_test_hero(&db, "A");
                let b = create_test_hero(&db, "B");
                link(&db, &b, &power, "Weak");
                link(&db, &a, &power, "Strong");

                let heroes = db.get_heroes_for_power(power.id).expect("Query failed").expect("Power missing");
                assert_eq!(heroes, vec![b, a]);
            }
        }

        describe "add_hero_to_power" {
            it "links the hero to the power" {
                let hero = create_test_hero(&db, "Wanda Maximoff");
                let power = create_test_power(&db, "chaos magic");

                let created = db.add_hero_to_power(power.id, AddHeroInput {
                    hero_id: Some(hero.id),
                    strength: Some("Strong".to_string()),
                }).expect("Failed to add hero");

                assert_eq!(created.hero_power.power_id, power.id);
                assert_eq!(created.hero, hero);
            }

            it "rejects a missing hero id" {
                let power = create_test_power(&db, "chaos magic");

                let err = db.add_hero_to_power(power.id, AddHeroInput {
                    hero_id: None,
                    strength: Some("Strong".to_string()),
                }).unwrap_err();

                assert!(matches!(err, Error::Validation(_)));
            }
        }
    }

    describe "hero_powers" {
        describe "create_hero_power" {
            it "accepts every listed strength" {
                let hero = create_test_hero(&db, "Jean Grey");
                let power = create_test_power(&db, "telekinesis");

                for (raw, expected) in [
                    ("Strong", Strength::Strong),
                    ("Weak", Strength::Weak),
                    ("Average", Strength::Average),
                ] {
                    assert_eq!(link(&db, &hero, &power, raw).strength, expected);
                }
            }

            it "rejects unlisted strengths" {
                let hero = create_test_hero(&db, "Jean Grey");
                let power = create_test_power(&db, "telekinesis");

                for raw in ["Medium", "strong", "AVERAGE", ""] {
                    let result = db.create_hero_power(CreateHeroPowerInput {
                        hero_id: Some(hero.id),
                        power_id: Some(power.id),
                        strength: Some(raw.to_string()),
                    });
                    assert!(matches!(result, Err(Error::Validation(_))), "{raw:?} accepted");
                }

                assert!(db.get_all_hero_powers().expect("Query failed").is_empty());
            }

            it "rejects a missing strength" {
                let hero = create_test_hero(&db, "Jean Grey");
                let power = create_test_power(&db, "telekinesis");

                let result = db.create_hero_power(CreateHeroPowerInput {
                    hero_id: Some(hero.id),
                    power_id: Some(power.id),
                    strength: None,
                });
                assert!(matches!(result, Err(Error::Validation(_))));
            }

            it "rejects missing hero or power ids" {
                let hero = create_test_hero(&db, "Jean Grey");
                let power = create_test_power(&db, "telekinesis");

                let no_hero = db.create_hero_power(CreateHeroPowerInput {
                    hero_id: None,
                    power_id: Some(power.id),
                    strength: Some("Strong".to_string()),
                });
                let no_power = db.create_hero_power(CreateHeroPowerInput {
                    hero_id: Some(hero.id),
                    power_id: None,
                    strength: Some("Strong".to_string()),
                });

                assert!(matches!(no_hero, Err(Error::Validation(_))));
                assert!(matches!(no_power, Err(Error::Validation(_))));
            }

            it "reports an unknown hero as not found" {
                let power = create_test_power(&db, "telekinesis");

                let result = db.create_hero_power(CreateHeroPowerInput {
                    hero_id: Some(404),
                    power_id: Some(power.id),
                    strength: Some("Strong".to_string()),
                });

                assert!(matches!(result, Err(Error::NotFound { entity: "Hero", id: 404 })));
                assert!(db.get_all_hero_powers().expect("Query failed").is_empty());
            }

            it "is reachable from both sides" {
                let hero = create_test_hero(&db, "Kitty Pryde");
                let power = db.create_power(CreatePowerInput {
                    name: Some("phasing".to_string()),
                    description: Some("x".repeat(MIN_DESCRIPTION_LEN)),
                }).expect("Failed to create power");
                link(&db, &hero, &power, "Strong");

                let powers = db.get_powers_for_hero(hero.id).expect("Query failed").expect("Hero missing");
                let heroes = db.get_heroes_for_power(power.id).expect("Query failed").expect("Power missing");

                assert_eq!(powers, vec![power]);
                assert_eq!(heroes, vec![hero]);
            }
        }

        describe "update_hero_power" {
            it "changes the strength" {
                let hero = create_test_hero(&db, "Elektra Natchios");
                let power = create_test_power(&db, "martial arts");
                let hp = link(&db, &hero, &power, "Weak");

                let updated = db.update_hero_power(hp.id, UpdateHeroPowerInput {
                    strength: Some("Strong".to_string()),
                }).expect("Update failed").expect("Hero power missing");

                assert_eq!(updated.strength, Strength::Strong);
                assert_eq!(updated.hero_id, hero.id);
                assert_eq!(db.get_hero_power(hp.id).expect("Query failed"), Some(updated));
            }

            it "rejects an unlisted strength and keeps the old one" {
                let hero = create_test_hero(&db, "Elektra Natchios");
                let power = create_test_power(&db, "martial arts");
                let hp = link(&db, &hero, &power, "Weak");

                let result = db.update_hero_power(hp.id, UpdateHeroPowerInput {
                    strength: Some("Medium".to_string()),
                });

                assert!(matches!(result, Err(Error::Validation(_))));
                assert_eq!(db.get_hero_power(hp.id).expect("Query failed"), Some(hp));
            }

            it "returns None for non-existent hero power" {
                let result = db.update_hero_power(404, UpdateHeroPowerInput {
                    strength: Some("Strong".to_string()),
                }).expect("Update failed");
                assert!(result.is_none());
            }
        }

        describe "delete_hero_power" {
            it "removes only the hero power" {
                let hero = create_test_hero(&db, "Elektra Natchios");
                let power = create_test_power(&db, "martial arts");
                let hp = link(&db, &hero, &power, "Average");

                assert!(db.delete_hero_power(hp.id).expect("Delete failed"));

                assert!(db.get_hero_power(hp.id).expect("Query failed").is_none());
                assert!(db.get_hero(hero.id).expect("Query failed").is_some());
                assert!(db.get_power(power.id).expect("Query failed").is_some());
            }
        }
    }

    describe "batch" {
        it "commits every write together" {
            let hero = db.batch(|batch| {
                let hero = batch.create_hero(CreateHeroInput::default())?;
                let power = batch.create_power(CreatePowerInput {
                    name: Some("flight".to_string()),
                    description: Some("gives the wielder the ability to fly".to_string()),
                })?;
                batch.create_hero_power(CreateHeroPowerInput {
                    hero_id: Some(hero.id),
                    power_id: Some(power.id),
                    strength: Some("Weak".to_string()),
                })?;
                Ok(hero)
            }).expect("Batch failed");

            let powers = db.get_powers_for_hero(hero.id).expect("Query failed").expect("Hero missing");
            assert_eq!(powers.len(), 1);
        }

        it "rolls back every write when one fails" {
            let kept = create_test_hero(&db, "Jean Grey");

            let result = db.batch(|batch| {
                batch.clear()?;
                let hero = batch.create_hero(CreateHeroInput::default())?;
                batch.create_hero_power(CreateHeroPowerInput {
                    hero_id: Some(hero.id),
                    power_id: Some(404),
                    strength: Some("Strong".to_string()),
                })
            });

            assert!(matches!(result, Err(Error::NotFound { entity: "Power", id: 404 })));
            assert_eq!(db.get_all_heroes().expect("Query failed"), vec![kept]);
        }
    }

    describe "rendering" {
        it "hero detail embeds powers but never the hero again" {
            let hero = create_test_hero(&db, "Kamala Khan");
            let power = create_test_power(&db, "elasticity");
            link(&db, &hero, &power, "Strong");

            let detail = db.get_hero_detail(hero.id).expect("Query failed").expect("Hero missing");
            let value = serde_json::to_value(&detail).expect("Serialize failed");

            assert_eq!(value["id"], hero.id);
            let hero_powers = value["hero_powers"].as_array().expect("hero_powers missing");
            assert_eq!(hero_powers.len(), 1);
            assert_eq!(hero_powers[0]["strength"], "Strong");
            assert_eq!(hero_powers[0]["power"]["id"], power.id);
            assert!(hero_powers[0].get("hero").is_none());
            assert!(hero_powers[0]["power"].get("hero_powers").is_none());
        }

        it "power detail embeds heroes but never the power again" {
            let hero = create_test_hero(&db, "Kamala Khan");
            let power = create_test_power(&db, "elasticity");
            link(&db, &hero, &power, "Average");

            let detail = db.get_power_detail(power.id).expect("Query failed").expect("Power missing");
            let value = serde_json::to_value(&detail).expect("Serialize failed");

            let hero_powers = value["hero_powers"].as_array().expect("hero_powers missing");
            assert_eq!(hero_powers[0]["hero"]["id"], hero.id);
            assert!(hero_powers[0].get("power").is_none());
            assert!(hero_powers[0]["hero"].get("hero_powers").is_none());
        }

        it "hero power detail carries both owners without their lists" {
            let hero = create_test_hero(&db, "Kamala Khan");
            let power = create_test_power(&db, "elasticity");
            let hp = link(&db, &hero, &power, "Weak");

            let detail = db.get_hero_power_detail(hp.id).expect("Query failed").expect("Hero power missing");
            let value = serde_json::to_value(&detail).expect("Serialize failed");

            assert_eq!(value["hero_id"], hero.id);
            assert_eq!(value["power_id"], power.id);
            assert_eq!(value["strength"], "Weak");
            assert_eq!(value["power"]["description"], "Gives super strength");
            assert!(value["hero"].get("hero_powers").is_none());
            assert!(value["power"].get("hero_powers").is_none());
        }
    }
}
