//! Command table and handlers for the Pokedex REPL
//!
//! The `CommandRegistry` is built once at startup and never mutated. Each
//! handler receives the session by mutable reference and returns the lines to
//! print.

use futures::future::BoxFuture;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::data::ApiError;
use crate::session::Session;

/// Errors reported by command handlers
#[derive(Debug, Error)]
pub enum CommandError {
    /// A required argument was not supplied
    #[error("no {0} provided")]
    MissingArgument(&'static str),

    /// The named pokemon is not in the pokedex
    #[error("you have not caught {0}")]
    NotCaught(String),

    /// The API request failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type CommandResult = Result<Vec<String>, CommandError>;

/// Everything a handler gets for one invocation
pub struct Invocation<'a> {
    pub session: &'a mut Session,
    pub registry: &'a CommandRegistry,
    pub args: &'a [String],
}

pub type Handler = for<'a> fn(Invocation<'a>) -> BoxFuture<'a, CommandResult>;

/// A named REPL command
#[derive(Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub description: &'static str,
    handler: Handler,
}

impl Command {
    /// Runs the handler with the given session and arguments
    pub async fn run(
        &self,
        session: &mut Session,
        registry: &CommandRegistry,
        args: &[String],
    ) -> CommandResult {
        (self.handler)(Invocation {
            session,
            registry,
            args,
        })
        .await
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Immutable mapping from command name to command
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Command>,
}

impl CommandRegistry {
    /// The standard Pokedex commands
    pub fn builtin() -> Self {
        let commands = [
            Command {
                name: "catch",
                description: "Catch a Pokemon",
                handler: catch,
            },
            Command {
                name: "exit",
                description: "Exit the Pokedex",
                handler: exit,
            },
            Command {
                name: "explore",
                description: "Explore a location in the Pokemon world",
                handler: explore,
            },
            Command {
                name: "help",
                description: "Displays a help message",
                handler: help,
            },
            Command {
                name: "inspect",
                description: "Inspect a Pokemon",
                handler: inspect,
            },
            Command {
                name: "map",
                description: "Display the next 20 locations in the Pokemon world",
                handler: map,
            },
            Command {
                name: "mapb",
                description: "Display the previous 20 locations in the Pokemon world",
                handler: mapb,
            },
            Command {
                name: "pokedex",
                description: "Display your Pokedex",
                handler: pokedex,
            },
        ];

        Self {
            commands: commands.into_iter().map(|c| (c.name, c)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Commands in name order
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }
}

fn required_arg<'a>(args: &'a [String], what: &'static str) -> Result<&'a str, CommandError> {
    args.first()
        .map(String::as_str)
        .ok_or(CommandError::MissingArgument(what))
}

fn help(inv: Invocation<'_>) -> BoxFuture<'_, CommandResult> {
    Box::pin(async move {
        let mut lines = vec![
            "Welcome to the Pokedex!".to_string(),
            "Usage:".to_string(),
            String::new(),
        ];
        lines.extend(
            inv.registry
                .iter()
                .map(|cmd| format!("{}: {}", cmd.name, cmd.description)),
        );
        Ok::<_, CommandError>(lines)
    })
}

fn exit(inv: Invocation<'_>) -> BoxFuture<'_, CommandResult> {
    Box::pin(async move {
        inv.session.should_quit = true;
        Ok::<_, CommandError>(vec!["Closing the Pokedex... Goodbye!".to_string()])
    })
}

fn map(inv: Invocation<'_>) -> BoxFuture<'_, CommandResult> {
    Box::pin(async move {
        let url = match &inv.session.next {
            Some(next) => next.clone(),
            None => inv.session.client.first_page_url(),
        };
        show_location_page(inv.session, &url).await
    })
}

fn mapb(inv: Invocation<'_>) -> BoxFuture<'_, CommandResult> {
    Box::pin(async move {
        let Some(url) = inv.session.previous.clone() else {
            return Ok(vec!["you're on the first page".to_string()]);
        };
        show_location_page(inv.session, &url).await
    })
}

/// Fetches a catalog page, moves both cursors, and lists the area names
async fn show_location_page(session: &mut Session, url: &str) -> CommandResult {
    let page = session.client.location_areas(url).await?;
    session.next = page.next;
    session.previous = page.previous;
    Ok(page.results.into_iter().map(|area| area.name).collect())
}

fn explore(inv: Invocation<'_>) -> BoxFuture<'_, CommandResult> {
    Box::pin(async move {
        let area = required_arg(inv.args, "location")?;
        let detail = inv.session.client.location_area(area).await?;

        let mut lines = vec![format!("Exploring {}...", area), "Found Pokemon:".to_string()];
        lines.extend(
            detail
                .pokemon_encounters
                .into_iter()
                .map(|encounter| format!(" - {}", encounter.pokemon.name)),
        );
        Ok::<_, CommandError>(lines)
    })
}

fn catch(inv: Invocation<'_>) -> BoxFuture<'_, CommandResult> {
    Box::pin(async move {
        let name = required_arg(inv.args, "pokemon name")?;
        let pokemon = inv.session.client.pokemon(name).await?;

        let outcome = if inv.session.try_catch(pokemon) {
            format!("{} was caught!", name)
        } else {
            format!("{} escaped!", name)
        };
        Ok::<_, CommandError>(vec![format!("Throwing a Pokeball at {}...", name), outcome])
    })
}

fn inspect(inv: Invocation<'_>) -> BoxFuture<'_, CommandResult> {
    Box::pin(async move {
        let name = required_arg(inv.args, "pokemon name")?;
        let pokemon = inv
            .session
            .pokedex
            .get(name)
            .ok_or_else(|| CommandError::NotCaught(name.to_string()))?;

        let mut lines = vec![
            format!("Name: {}", pokemon.name),
            format!("Height: {}", pokemon.height),
            format!("Weight: {}", pokemon.weight),
            "Stats:".to_string(),
        ];
        lines.extend(
            pokemon
                .stat_values()
                .into_iter()
                .map(|(stat, value)| format!("  -{}: {}", stat, value)),
        );
        lines.push("Types:".to_string());
        lines.extend(pokemon.type_names().into_iter().map(|t| format!("  -{}", t)));
        Ok::<_, CommandError>(lines)
    })
}

fn pokedex(inv: Invocation<'_>) -> BoxFuture<'_, CommandResult> {
    Box::pin(async move {
        let mut lines = vec!["Your Pokedex:".to_string()];
        lines.extend(inv.session.pokedex.keys().map(|name| format!(" - {}", name)));
        Ok::<_, CommandError>(lines)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseCache;
    use crate::data::{CachedFetcher, PokeApiClient};
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session(base_url: &str) -> Session {
        let cache = Arc::new(ResponseCache::new(Duration::from_secs(30)));
        let client = PokeApiClient::new(CachedFetcher::new(cache)).with_base_url(base_url);
        Session::with_seed(client, 7)
    }

    async fn run(
        registry: &CommandRegistry,
        session: &mut Session,
        name: &str,
        args: &[&str],
    ) -> CommandResult {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let command = registry.get(name).expect("command should exist");
        command.run(session, registry, &args).await
    }

    fn pokemon_json(name: &str, base_experience: u32) -> String {
        format!(
            r#"{{
                "id": 1,
                "name": "{}",
                "base_experience": {},
                "height": 7,
                "weight": 69,
                "stats": [
                    {{"base_stat": 45, "stat": {{"name": "hp", "url": "u"}}}},
                    {{"base_stat": 49, "stat": {{"name": "attack", "url": "u"}}}}
                ],
                "types": [
                    {{"slot": 2, "type": {{"name": "poison", "url": "u"}}}},
                    {{"slot": 1, "type": {{"name": "grass", "url": "u"}}}}
                ]
            }}"#,
            name, base_experience
        )
    }

    #[test]
    fn test_builtin_registry_has_all_commands() {
        let registry = CommandRegistry::builtin();
        let names: Vec<_> = registry.iter().map(|c| c.name).collect();

        assert_eq!(
            names,
            ["catch", "exit", "explore", "help", "inspect", "map", "mapb", "pokedex"]
        );
        assert!(registry.get("fly").is_none());
    }

    #[tokio::test]
    async fn test_help_lists_commands() {
        let registry = CommandRegistry::builtin();
        let mut session = session("http://127.0.0.1:9");

        let lines = run(&registry, &mut session, "help", &[]).await.unwrap();

        assert_eq!(lines[0], "Welcome to the Pokedex!");
        assert_eq!(lines[1], "Usage:");
        assert!(lines.contains(&"map: Display the next 20 locations in the Pokemon world".to_string()));
        assert!(lines.contains(&"exit: Exit the Pokedex".to_string()));
        assert_eq!(lines.len(), 3 + 8);
    }

    #[tokio::test]
    async fn test_exit_sets_should_quit() {
        let registry = CommandRegistry::builtin();
        let mut session = session("http://127.0.0.1:9");

        let lines = run(&registry, &mut session, "exit", &[]).await.unwrap();

        assert!(session.should_quit);
        assert_eq!(lines, ["Closing the Pokedex... Goodbye!"]);
    }

    #[tokio::test]
    async fn test_mapb_on_first_page() {
        let registry = CommandRegistry::builtin();
        let mut session = session("http://127.0.0.1:9");

        let lines = run(&registry, &mut session, "mapb", &[]).await.unwrap();

        assert_eq!(lines, ["you're on the first page"]);
    }

    #[tokio::test]
    async fn test_map_pages_forward_and_back_using_cache() {
        let server = MockServer::start().await;
        let uri = server.uri();
        Mock::given(method("GET"))
            .and(path("/location-area/"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"{{"count": 3, "next": "{uri}/location-area/?offset=20&limit=20", "previous": null,
                    "results": [{{"name": "canalave-city-area", "url": "u"}}, {{"name": "eterna-city-area", "url": "u"}}]}}"#
            )))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/location-area/"))
            .and(query_param("offset", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"{{"count": 3, "next": null, "previous": "{uri}/location-area/?offset=0&limit=20",
                    "results": [{{"name": "mt-coronet-1f-route-207", "url": "u"}}]}}"#
            )))
            .expect(1)
            .mount(&server)
            .await;

        let registry = CommandRegistry::builtin();
        let mut session = session(&uri);

        let first = run(&registry, &mut session, "map", &[]).await.unwrap();
        assert_eq!(first, ["canalave-city-area", "eterna-city-area"]);

        let second = run(&registry, &mut session, "map", &[]).await.unwrap();
        assert_eq!(second, ["mt-coronet-1f-route-207"]);
        assert!(session.next.is_none());

        // Served from the cache: the first-page mock expects a single request
        let back = run(&registry, &mut session, "mapb", &[]).await.unwrap();
        assert_eq!(back, ["canalave-city-area", "eterna-city-area"]);
        assert!(session.previous.is_none());
    }

    #[tokio::test]
    async fn test_explore_lists_encounters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/location-area/pastoria-city-area"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"name": "pastoria-city-area", "pokemon_encounters": [
                    {"pokemon": {"name": "tentacool", "url": "u"}},
                    {"pokemon": {"name": "magikarp", "url": "u"}}
                ]}"#,
            ))
            .mount(&server)
            .await;

        let registry = CommandRegistry::builtin();
        let mut session = session(&server.uri());

        let lines = run(&registry, &mut session, "explore", &["pastoria-city-area"])
            .await
            .unwrap();

        assert_eq!(
            lines,
            [
                "Exploring pastoria-city-area...",
                "Found Pokemon:",
                " - tentacool",
                " - magikarp"
            ]
        );
    }

    #[tokio::test]
    async fn test_explore_without_argument() {
        let registry = CommandRegistry::builtin();
        let mut session = session("http://127.0.0.1:9");

        let result = run(&registry, &mut session, "explore", &[]).await;

        assert!(matches!(result, Err(CommandError::MissingArgument("location"))));
    }

    #[tokio::test]
    async fn test_catch_then_inspect_and_pokedex() {
        let server = MockServer::start().await;
        // Base experience 600 puts the threshold at 0, so every roll catches
        Mock::given(method("GET"))
            .and(path("/pokemon/bulbasaur"))
            .respond_with(ResponseTemplate::new(200).set_body_string(pokemon_json("bulbasaur", 600)))
            .mount(&server)
            .await;

        let registry = CommandRegistry::builtin();
        let mut session = session(&server.uri());

        let caught = run(&registry, &mut session, "catch", &["bulbasaur"]).await.unwrap();
        assert_eq!(
            caught,
            ["Throwing a Pokeball at bulbasaur...", "bulbasaur was caught!"]
        );

        let inspected = run(&registry, &mut session, "inspect", &["bulbasaur"]).await.unwrap();
        assert_eq!(
            inspected,
            [
                "Name: bulbasaur",
                "Height: 7",
                "Weight: 69",
                "Stats:",
                "  -hp: 45",
                "  -attack: 49",
                "Types:",
                "  -grass",
                "  -poison",
            ]
        );

        let listed = run(&registry, &mut session, "pokedex", &[]).await.unwrap();
        assert_eq!(listed, ["Your Pokedex:", " - bulbasaur"]);
    }

    #[tokio::test]
    async fn test_catch_can_escape() {
        let server = MockServer::start().await;
        // Base experience 0 puts the threshold at 100, out of reach of any roll
        Mock::given(method("GET"))
            .and(path("/pokemon/magikarp"))
            .respond_with(ResponseTemplate::new(200).set_body_string(pokemon_json("magikarp", 0)))
            .mount(&server)
            .await;

        let registry = CommandRegistry::builtin();
        let mut session = session(&server.uri());

        let lines = run(&registry, &mut session, "catch", &["magikarp"]).await.unwrap();

        assert_eq!(lines[1], "magikarp escaped!");
        assert!(session.pokedex.is_empty());
    }

    #[tokio::test]
    async fn test_catch_unknown_pokemon_reports_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon/missingno"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let registry = CommandRegistry::builtin();
        let mut session = session(&server.uri());

        let result = run(&registry, &mut session, "catch", &["missingno"]).await;

        assert!(matches!(result, Err(CommandError::Api(_))));
    }

    #[tokio::test]
    async fn test_inspect_uncaught_pokemon() {
        let registry = CommandRegistry::builtin();
        let mut session = session("http://127.0.0.1:9");

        let err = run(&registry, &mut session, "inspect", &["mew"]).await.unwrap_err();

        assert_eq!(err.to_string(), "you have not caught mew");
    }
}
