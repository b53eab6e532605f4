//! Player reference parser
//!
//! Accepts the ways people point at a Dota player:
//!
//! ```text
//! 86745912                                     account id
//! 76561198047011640                            64-bit steam id
//! <@123456> / <@!123456>                       chat mention
//! https://www.opendota.com/players/86745912    OpenDota / Dotabuff profile
//! steamcommunity.com/profiles/7656119...       Steam profile
//! @name / name                                 linked account name
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{char, digit1},
    combinator::{all_consuming, map, map_res, opt, rest, value},
    sequence::{delimited, pair, preceded},
    IResult,
};

use super::PlayerError;

/// Offset between 64-bit steam ids and 32-bit account ids
pub const STEAM_ID64_BASE: u64 = 76561197960265728;

/// Convert a 64-bit steam id to an account id. Account ids pass through.
pub fn steam64_to_account_id(id: u64) -> u64 {
    if id > STEAM_ID64_BASE {
        id - STEAM_ID64_BASE
    } else {
        id
    }
}

/// A parsed player reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerRef {
    /// Dota account id (already converted from steam64 if needed)
    AccountId(u64),
    /// Chat user id from a mention
    Mention(u64),
    /// Name of a linked account
    Name(String),
}

/// Parse a player reference
pub fn parse_player_ref(input: &str) -> Result<PlayerRef, PlayerError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PlayerError::InvalidReference(input.to_string()));
    }

    match all_consuming(parse_reference)(input) {
        Ok((_, player)) => Ok(player),
        Err(_) => Err(PlayerError::InvalidReference(input.to_string())),
    }
}

fn parse_reference(input: &str) -> IResult<&str, PlayerRef> {
    alt((
        parse_mention,
        parse_profile_url,
        parse_steam_url,
        all_consuming(parse_account_id),
        parse_name,
    ))(input)
}

fn parse_id(input: &str) -> IResult<&str, u64> {
    map_res(digit1, |s: &str| s.parse::<u64>())(input)
}

fn parse_account_id(input: &str) -> IResult<&str, PlayerRef> {
    map(parse_id, |id| PlayerRef::AccountId(steam64_to_account_id(id)))(input)
}

/// `<@123>` or `<@!123>`
fn parse_mention(input: &str) -> IResult<&str, PlayerRef> {
    map(
        delimited(tag("<@"), preceded(opt(char('!')), parse_id), char('>')),
        PlayerRef::Mention,
    )(input)
}

/// Optional `http(s)://` and `www.`
fn parse_url_prefix(input: &str) -> IResult<&str, ()> {
    value(
        (),
        pair(
            opt(alt((tag_no_case("https://"), tag_no_case("http://")))),
            opt(tag_no_case("www.")),
        ),
    )(input)
}

/// Anything after the id, e.g. `/matches`
fn parse_trailing_path(input: &str) -> IResult<&str, ()> {
    value((), opt(preceded(char('/'), rest)))(input)
}

fn parse_profile_url(input: &str) -> IResult<&str, PlayerRef> {
    let (input, _) = parse_url_prefix(input)?;
    let (input, _) = alt((tag_no_case("opendota.com"), tag_no_case("dotabuff.com")))(input)?;
    let (input, _) = tag("/players/")(input)?;
    let (input, player) = parse_account_id(input)?;
    let (input, _) = parse_trailing_path(input)?;
    Ok((input, player))
}

fn parse_steam_url(input: &str) -> IResult<&str, PlayerRef> {
    let (input, _) = parse_url_prefix(input)?;
    let (input, _) = tag_no_case("steamcommunity.com/profiles/")(input)?;
    let (input, player) = parse_account_id(input)?;
    let (input, _) = parse_trailing_path(input)?;
    Ok((input, player))
}

fn parse_name(input: &str) -> IResult<&str, PlayerRef> {
    map(
        preceded(
            opt(char('@')),
            take_while1(|c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ' ')),
        ),
        |name: &str| PlayerRef::Name(name.trim().to_string()),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steam64_conversion() {
        assert_eq!(steam64_to_account_id(76561198047011640), 86745912);
        assert_eq!(steam64_to_account_id(86745912), 86745912);
        assert_eq!(steam64_to_account_id(STEAM_ID64_BASE), STEAM_ID64_BASE);
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(
            parse_player_ref("86745912").unwrap(),
            PlayerRef::AccountId(86745912)
        );
        assert_eq!(
            parse_player_ref(" 76561198047011640 ").unwrap(),
            PlayerRef::AccountId(86745912)
        );
    }

    #[test]
    fn test_parse_mention() {
        assert_eq!(parse_player_ref("<@1234>").unwrap(), PlayerRef::Mention(1234));
        assert_eq!(parse_player_ref("<@!1234>").unwrap(), PlayerRef::Mention(1234));
    }

    #[test]
    fn test_parse_profile_urls() {
        for url in [
            "https://www.opendota.com/players/86745912",
            "http://opendota.com/players/86745912/matches",
            "dotabuff.com/players/86745912",
            "https://steamcommunity.com/profiles/76561198047011640/",
        ] {
            assert_eq!(
                parse_player_ref(url).unwrap(),
                PlayerRef::AccountId(86745912),
                "url: {}",
                url
            );
        }
    }

    #[test]
    fn test_parse_name() {
        assert_eq!(
            parse_player_ref("@dendi").unwrap(),
            PlayerRef::Name("dendi".to_string())
        );
        assert_eq!(
            parse_player_ref("Miracle-").unwrap(),
            PlayerRef::Name("Miracle-".to_string())
        );
        assert_eq!(
            parse_player_ref("team captain").unwrap(),
            PlayerRef::Name("team captain".to_string())
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            parse_player_ref(""),
            Err(PlayerError::InvalidReference(_))
        ));
        assert!(matches!(
            parse_player_ref("<@abc>"),
            Err(PlayerError::InvalidReference(_))
        ));
        assert!(matches!(
            parse_player_ref("https://example.com/u/1"),
            Err(PlayerError::InvalidReference(_))
        ));
    }
}
