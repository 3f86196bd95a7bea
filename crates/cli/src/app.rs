use std::time::Duration;

use anyhow::Result;
use tokio::{
    io::{self, AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{debug, info, warn};
use vgo_core::{
    catalog::{GameSummary, Page},
    CatalogClient, CatalogError, GameList, GameListItem, ListError, ListStorage, ListStore,
    SearchDebouncer,
};

const HELP: &str = "\
Commands:
  search <query>            search games (debounced)
  trending                  games recently added by many players
  game <id>                 show a game's details
  platforms <query>         search consoles
  lists                     show all lists
  create <title>            create a list
  show <list>               show a list's items
  rename <list> <title>     rename a list
  add <list> <game-id>      add a game to a list
  remove <list> <game-id>   remove a game from a list
  delete <list>             delete a list
  delete-all                delete every list
  quit";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Search(String),
    Trending,
    Game(u64),
    Platforms(String),
    Lists,
    Create(String),
    Show(String),
    Rename { list: String, title: String },
    Add { list: String, game_id: u64 },
    Remove { list: String, game_id: u64 },
    Delete(String),
    DeleteAll,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map(|(verb, rest)| (verb, rest.trim()))
        .unwrap_or((line, ""));

    let command = match verb {
        "search" | "s" => Command::Search(rest.to_string()),
        "trending" => Command::Trending,
        "game" => Command::Game(parse_id(rest)?),
        "platforms" => Command::Platforms(required(rest, "query")?),
        "lists" | "ls" => Command::Lists,
        "create" => Command::Create(required(rest, "title")?),
        "show" => Command::Show(required(rest, "list")?),
        "rename" => {
            let (list, title) = split_pair(rest, "rename <list> <title>")?;
            Command::Rename { list, title }
        }
        "add" => {
            let (list, id) = split_pair(rest, "add <list> <game-id>")?;
            Command::Add {
                list,
                game_id: parse_id(&id)?,
            }
        }
        "remove" | "rm" => {
            let (list, id) = split_pair(rest, "remove <list> <game-id>")?;
            Command::Remove {
                list,
                game_id: parse_id(&id)?,
            }
        }
        "delete" => Command::Delete(required(rest, "list")?),
        "delete-all" => Command::DeleteAll,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command `{other}`; try `help`")),
    };
    Ok(Some(command))
}

fn required(value: &str, what: &str) -> Result<String, String> {
    if value.is_empty() {
        Err(format!("missing {what}"))
    } else {
        Ok(value.to_string())
    }
}

fn split_pair(rest: &str, usage: &str) -> Result<(String, String), String> {
    rest.split_once(char::is_whitespace)
        .map(|(first, second)| (first.to_string(), second.trim().to_string()))
        .filter(|(_, second)| !second.is_empty())
        .ok_or_else(|| format!("usage: {usage}"))
}

fn parse_id(value: &str) -> Result<u64, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("`{value}` is not a numeric id"))
}

/// Find a list by exact id, case-insensitive title or unique id prefix, in that order.
fn resolve_list<'a>(lists: &'a [GameList], reference: &str) -> Option<&'a GameList> {
    if let Some(list) = lists.iter().find(|list| list.id == reference) {
        return Some(list);
    }
    if let Some(list) = lists
        .iter()
        .find(|list| list.title.eq_ignore_ascii_case(reference))
    {
        return Some(list);
    }
    let mut prefixed = lists.iter().filter(|list| list.id.starts_with(reference));
    match (prefixed.next(), prefixed.next()) {
        (Some(list), None) => Some(list),
        _ => None,
    }
}

enum AppEvent {
    Input(Option<String>),
    SearchDone {
        query: String,
        result: Result<Page<GameSummary>, CatalogError>,
    },
}

/// Line-oriented host wiring the list store and the catalog client together.
pub struct VgoApp<S> {
    store: ListStore<S>,
    catalog: CatalogClient,
    debouncer: SearchDebouncer,
}

impl<S: ListStorage> VgoApp<S> {
    pub fn new(store: ListStore<S>, catalog: CatalogClient, debounce: Duration) -> Self {
        Self {
            store,
            catalog,
            debouncer: SearchDebouncer::new(debounce),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let lists = self.store.all();
        info!(total = lists.len(), "Lists loaded");
        println!("vgo: {} lists. Type `help` for commands.", lists.len());

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(32);
        spawn_input_task(event_tx.clone());

        while let Some(event) = event_rx.recv().await {
            match event {
                AppEvent::Input(None) => break,
                AppEvent::Input(Some(line)) => match parse_command(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => self.execute(command, &event_tx).await,
                    Ok(None) => {}
                    Err(message) => println!("{message}"),
                },
                AppEvent::SearchDone { query, result } => match result {
                    Ok(page) => print_games(&format!("Results for \"{query}\""), &page),
                    Err(err) => println!("Search failed: {err}"),
                },
            }
        }

        self.debouncer.cancel();
        Ok(())
    }

    async fn execute(&mut self, command: Command, events: &mpsc::Sender<AppEvent>) {
        debug!(?command, "Executing command");
        match command {
            Command::Search(query) => {
                let catalog = self.catalog.clone();
                let events = events.clone();
                let scheduled = self.debouncer.submit(&query, move |query| async move {
                    let result = catalog.search_games(&query, 1).await;
                    let _ = events.send(AppEvent::SearchDone { query, result }).await;
                });
                if !scheduled {
                    println!("Search cleared");
                }
            }
            Command::Trending => match self.catalog.trending_games().await {
                Ok(page) => print_games("Trending", &page),
                Err(err) => println!("{err}"),
            },
            Command::Game(id) => self.show_game(id).await,
            Command::Platforms(query) => match self.catalog.search_platforms(&query).await {
                Ok(page) => {
                    for platform in &page.results {
                        let games = platform.games_count.unwrap_or_default();
                        println!("  [{}] {} ({games} games)", platform.id, platform.name);
                    }
                    if page.results.is_empty() {
                        println!("No consoles found for \"{query}\"");
                    }
                }
                Err(err) => println!("{err}"),
            },
            Command::Lists => self.print_lists(),
            Command::Create(title) => match self.store.create(&title) {
                Ok(list) => println!("Created {} [{}]", list.title, short_id(&list.id)),
                Err(err) => println!("{err}"),
            },
            Command::Show(reference) => match self.find_list(&reference) {
                Some(list) => print_list(&list),
                None => println!("No list matches `{reference}`"),
            },
            Command::Rename { list, title } => {
                self.with_list(&list, |store, id| store.rename(id, &title));
            }
            Command::Add { list, game_id } => {
                let Some(target) = self.find_list(&list) else {
                    println!("No list matches `{list}`");
                    return;
                };
                if target.contains(game_id) {
                    println!("Already in {}", target.title);
                    return;
                }
                match self.catalog.game_details(game_id).await {
                    Ok(details) => {
                        let item = GameListItem::from(&details);
                        self.with_list(&target.id, |store, id| store.add_item(id, item));
                    }
                    Err(err) => println!("{err}"),
                }
            }
            Command::Remove { list, game_id } => {
                self.with_list(&list, |store, id| store.remove_item(id, game_id));
            }
            Command::Delete(reference) => match self.find_list(&reference) {
                Some(list) => match self.store.delete(&list.id) {
                    Ok(()) => println!("Deleted {}", list.title),
                    Err(err) => println!("{err}"),
                },
                None => println!("No list matches `{reference}`"),
            },
            Command::DeleteAll => match self.store.delete_all() {
                Ok(()) => println!("All lists deleted"),
                Err(err) => println!("{err}"),
            },
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
    }

    fn find_list(&self, reference: &str) -> Option<GameList> {
        let lists = self.store.all();
        resolve_list(&lists, reference).cloned()
    }

    fn with_list<F>(&self, reference: &str, apply: F)
    where
        F: FnOnce(&ListStore<S>, &str) -> Result<GameList, ListError>,
    {
        let Some(list) = self.find_list(reference) else {
            println!("No list matches `{reference}`");
            return;
        };
        match apply(&self.store, &list.id) {
            Ok(updated) => println!("{}", updated.summary()),
            Err(ListError::DuplicateItem { .. }) => println!("Already in {}", list.title),
            Err(err) => {
                warn!("List update failed: {err}");
                println!("{err}");
            }
        }
    }

    async fn show_game(&self, id: u64) {
        let details = match self.catalog.game_details(id).await {
            Ok(details) => details,
            Err(err) => {
                println!("{err}");
                return;
            }
        };
        println!("{} [{}]", details.name, details.id);
        if let Some(released) = &details.released {
            println!("  Released: {released}");
        }
        if let Some(rating) = details.rating {
            println!("  Rating: {rating:.1}");
        }
        if !details.platforms.is_empty() {
            let names: Vec<_> = details
                .platforms
                .iter()
                .map(|entry| entry.platform.name.as_str())
                .collect();
            println!("  Platforms: {}", names.join(", "));
        }
        if !details.genres.is_empty() {
            let names: Vec<_> = details.genres.iter().map(|g| g.name.as_str()).collect();
            println!("  Genres: {}", names.join(", "));
        }

        let (screenshots, trailers) = tokio::join!(
            self.catalog.game_screenshots(id),
            self.catalog.game_trailers(id)
        );
        match screenshots {
            Ok(shots) => println!("  Screenshots: {}", shots.len()),
            Err(err) => println!("  Screenshots unavailable: {err}"),
        }
        match trailers {
            Ok(trailers) => {
                for trailer in trailers.iter().take(3) {
                    let source = trailer.best_source().unwrap_or("-");
                    println!("  Trailer: {} {source}", trailer.name);
                }
            }
            Err(err) => println!("  Trailers unavailable: {err}"),
        }

        let holders: Vec<_> = self
            .store
            .all()
            .into_iter()
            .filter(|list| list.contains(id))
            .map(|list| list.title)
            .collect();
        if !holders.is_empty() {
            println!("  In lists: {}", holders.join(", "));
        }
    }

    fn print_lists(&self) {
        let lists = match self.store.try_all() {
            Ok(lists) => lists,
            Err(err) => {
                println!("{err}");
                return;
            }
        };
        if lists.is_empty() {
            println!("No lists created yet");
            return;
        }
        for list in &lists {
            println!(
                "  [{}] {} created {}",
                short_id(&list.id),
                list.summary(),
                list.created_at.format("%Y-%m-%d")
            );
        }
    }
}

fn spawn_input_task(sender: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(line) => line,
                Err(err) => {
                    warn!("Failed to read input: {err}");
                    None
                }
            };
            let done = line.is_none();
            if sender.send(AppEvent::Input(line)).await.is_err() || done {
                break;
            }
        }
    });
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn print_games(heading: &str, page: &Page<GameSummary>) {
    println!("{heading} ({} total)", page.count);
    if page.results.is_empty() {
        println!("  No results found");
    }
    for game in &page.results {
        let item = GameListItem::from(game);
        println!("  {}", describe_item(&item));
    }
}

fn print_list(list: &GameList) {
    println!("{} [{}]", list.summary(), list.id);
    if list.is_empty() {
        println!("  This list is empty");
    }
    for (index, item) in list.items.iter().enumerate() {
        println!("  {:>3}. {}", index + 1, describe_item(item));
    }
}

fn describe_item(item: &GameListItem) -> String {
    let mut line = format!("[{}] {}", item.id, item.name);
    if let Some(year) = item.release_year() {
        line.push_str(&format!(" ({year})"));
    }
    if let Some(rating) = item.rating {
        line.push_str(&format!(" ★ {rating:.1}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use vgo_core::MemoryStorage;

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_command("search  chrono trigger "),
            Ok(Some(Command::Search("chrono trigger".into())))
        );
        assert_eq!(
            parse_command("add rpgs 101"),
            Ok(Some(Command::Add {
                list: "rpgs".into(),
                game_id: 101
            }))
        );
        assert_eq!(
            parse_command("rename 1a2b Best RPGs"),
            Ok(Some(Command::Rename {
                list: "1a2b".into(),
                title: "Best RPGs".into()
            }))
        );
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(parse_command("q"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(parse_command("add rpgs").is_err());
        assert!(parse_command("remove rpgs abc").is_err());
        assert!(parse_command("create").is_err());
        assert!(parse_command("launch").is_err());
    }

    #[test]
    fn resolves_lists_by_id_prefix_or_title() -> Result<()> {
        let store = ListStore::new(MemoryStorage::new());
        let rpgs = store.create("RPGs")?;
        let shooters = store.create("Shooters")?;
        let lists = store.all();

        assert_eq!(resolve_list(&lists, &rpgs.id).map(|l| &l.id), Some(&rpgs.id));
        assert_eq!(
            resolve_list(&lists, short_id(&shooters.id)).map(|l| &l.id),
            Some(&shooters.id)
        );
        assert_eq!(resolve_list(&lists, "rpgs").map(|l| &l.id), Some(&rpgs.id));
        assert!(resolve_list(&lists, "platformers").is_none());
        Ok(())
    }

    #[test]
    fn title_match_wins_over_id_prefix() -> Result<()> {
        let store = ListStore::new(MemoryStorage::new());
        let keepers = store.create("Keepers")?;
        let prefix = &keepers.id[..2];
        let short = store.create(prefix)?;
        let lists = store.all();

        assert_eq!(
            resolve_list(&lists, prefix).map(|l| &l.id),
            Some(&short.id)
        );
        assert_eq!(
            resolve_list(&lists, &keepers.id[..8]).map(|l| &l.id),
            Some(&keepers.id)
        );
        Ok(())
    }

    #[test]
    fn describes_items_with_year_and_rating() {
        let item = GameListItem {
            id: 101,
            name: "Chrono Trigger".into(),
            image: None,
            rating: Some(4.62),
            released: Some("1995-03-11".into()),
        };
        assert_eq!(describe_item(&item), "[101] Chrono Trigger (1995) ★ 4.6");
    }
}
