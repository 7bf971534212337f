//! Outbound affiliate URL construction.

use modfeed_core::ItemFields;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::context::ParseContext;

use super::ParseModule;

/// Replaces the raw product URL with the network's tracked outbound URL.
///
/// The network comes from the vendor row; the affiliate id prefers the
/// per-item id over the vendor-level one. A vendor without a network, or a
/// tracked network without an affiliate id, yields no outbound URL at all:
/// the field is cleared and validation will reject the record rather than
/// let an untracked link into the catalog.
pub struct BuildBuyUrl;

impl ParseModule for BuildBuyUrl {
    fn name(&self) -> &'static str {
        "build_buy_url"
    }

    fn apply(&self, ctx: &ParseContext<'_>, scraped: &ItemFields, parsed: &mut ItemFields) {
        parsed.url = build_buy_url(ctx, scraped);
    }
}

fn build_buy_url(ctx: &ParseContext<'_>, scraped: &ItemFields) -> Option<String> {
    let network = ctx.vendor.affiliate_network.as_deref()?;

    // Hosted redirect: no network-side tracking, the site resolves the key.
    if network == "direct" {
        return Some(format!(
            "{}/redirect/{}/{}",
            ctx.site_base_url, ctx.vendor.slug, ctx.item_key
        ));
    }

    let url = scraped.url.as_deref()?;
    let affiliate_id = scraped
        .affiliate_id
        .as_deref()
        .or(ctx.vendor.affiliate_id.as_deref())?;
    let encoded = utf8_percent_encode(url, NON_ALPHANUMERIC);

    let built = match network {
        "tradedoubler" => format!("https://clk.tradedoubler.com/click?a({affiliate_id})url({encoded})"),
        "zanox" => format!("https://ad.zanox.com/ppc/?{affiliate_id}&ulp=[[{encoded}]]"),
        "awin" => format!("https://www.awin1.com/cread.php?awinmid={affiliate_id}&p={encoded}"),
        "cj" => format!("https://www.anrdoezrs.net/links/{affiliate_id}/type/dlg/{url}"),
        "linkshare" => {
            format!("https://click.linksynergy.com/deeplink?id={affiliate_id}&murl={encoded}")
        }
        "adtraction" => format!("https://track.adtraction.com/t/t?a={affiliate_id}&url={encoded}"),
        other => {
            tracing::warn!(
                vendor = %ctx.vendor.slug,
                network = other,
                "unknown affiliate network, clearing url"
            );
            return None;
        }
    };
    Some(built)
}
