// In crates/web-server/src/dashboard.rs

use app_config::types::DashboardSettings;

/// Renders the single-page dashboard with the configured defaults baked in.
pub fn render(settings: &DashboardSettings) -> String {
    INDEX_HTML
        .replace("__DEFAULT_TIMEFRAME__", settings.default_timeframe.label())
        .replace("__AUTO_REFRESH_MS__", &(settings.auto_refresh_secs * 1000).to_string())
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Crypto Trend Dashboard</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 0; background: #0f1117; color: #e6e6e6; }
  header { display: flex; gap: 1rem; align-items: center; padding: 1rem 2rem; background: #181b24; }
  header h1 { font-size: 1.3rem; margin: 0 auto 0 0; }
  main { padding: 1rem 2rem; }
  .cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 1rem; }
  .card { background: #181b24; border-radius: 8px; padding: 1rem; cursor: pointer; border: 2px solid transparent; }
  .card.selected { border-color: #4c8bf5; }
  .card .price { font-size: 1.4rem; font-weight: 600; }
  .BULLISH { color: #26a69a; } .BEARISH { color: #ef5350; } .NEUTRAL { color: #9e9e9e; }
  .warn { color: #ffb74d; }
  .muted { color: #8a8f98; font-size: 0.85rem; }
  canvas { width: 100%; height: 380px; background: #181b24; border-radius: 8px; margin-top: 1rem; }
  table { border-collapse: collapse; margin-top: 1rem; }
  td, th { padding: 0.4rem 0.8rem; text-align: center; }
</style>
</head>
<body>
<header>
  <h1>Crypto Trend Dashboard</h1>
  <label>Timeframe <select id="timeframe"></select></label>
  <label><input type="checkbox" id="auto"> Auto-refresh</label>
  <button id="refresh">Refresh</button>
</header>
<main>
  <div class="cards" id="cards"></div>
  <canvas id="chart" width="1200" height="380"></canvas>
  <div id="details" class="muted"></div>
  <h2>Trend heatmap</h2>
  <table id="heatmap"></table>
  <p class="muted" id="updated"></p>
</main>
<script>
const DEFAULT_TIMEFRAME = "__DEFAULT_TIMEFRAME__";
const AUTO_REFRESH_MS = __AUTO_REFRESH_MS__;
let selected = null;
let timer = null;

const $ = (id) => document.getElementById(id);
const esc = (s) => String(s).replace(/[&<>"']/g, (c) => ({ "&": "&amp;", "<": "&lt;", ">": "&gt;", '"': "&quot;", "'": "&#39;" })[c]);
const fmt = (v, d = 2) => Number(v).toLocaleString(undefined, { minimumFractionDigits: d, maximumFractionDigits: d });

async function getJson(url) {
  const res = await fetch(url);
  const body = await res.json();
  if (!res.ok) throw new Error(body.error || res.statusText);
  return body;
}

async function loadTimeframes() {
  const data = await getJson("/api/timeframes");
  const select = $("timeframe");
  for (const tf of data.timeframes) {
    const opt = document.createElement("option");
    opt.value = opt.textContent = tf;
    select.appendChild(opt);
  }
  select.value = data.default || DEFAULT_TIMEFRAME;
}

async function loadSummary() {
  const tf = $("timeframe").value;
  const data = await getJson(`/api/trends?timeframe=${tf}`);
  const cards = $("cards");
  cards.innerHTML = "";
  for (const a of data.assets) {
    const card = document.createElement("div");
    card.className = "card" + (a.id === selected ? " selected" : "");
    if (a.status === "ok") {
      const t = a.analysis;
      const change = a.change_pct == null ? "" : `${a.change_pct >= 0 ? "+" : ""}${fmt(a.change_pct)}%`;
      const cross = t.crossover_periods_ago == null ? "no recent crossover" : `crossover ${t.crossover_periods_ago} periods ago`;
      card.innerHTML = `<div>${esc(a.name)}</div><div class="price">$${fmt(a.price)} <span class="muted">${change}</span></div>
        <div class="${t.trend}">${t.trend} · strength ${t.strength.toFixed(1)}</div>
        <div class="muted">EMA ${fmt(t.ema_short_value)} / ${fmt(t.ema_long_value)} · ${cross}</div>`;
    } else {
      card.innerHTML = `<div>${esc(a.name)}</div><div class="warn">${esc(a.message)}</div>`;
    }
    card.onclick = () => { selected = a.id; loadSummary(); loadChart(); };
    cards.appendChild(card);
  }
  if (!selected && data.assets.length) { selected = data.assets[0].id; loadChart(); }
}

function drawChart(data) {
  const canvas = $("chart");
  const ctx = canvas.getContext("2d");
  const w = canvas.width, h = canvas.height, pad = 40, right = 150;
  ctx.clearRect(0, 0, w, h);
  const bars = data.bars;
  const values = bars.flatMap((b) => [b.high, b.low, b.ema_short, b.ema_long]);
  const min = Math.min(...values), max = Math.max(...values);
  const span = max - min || 1;
  const step = (w - pad - right) / bars.length;
  const x = (i) => pad + step * (i + 0.5);
  const y = (v) => h - pad - ((v - min) / span) * (h - 2 * pad);
  const index = new Map(bars.map((b, i) => [b.timestamp, i]));

  // Candles: wick from low to high, body from open to close.
  bars.forEach((b, i) => {
    const color = b.close >= b.open ? "#26a69a" : "#ef5350";
    ctx.strokeStyle = ctx.fillStyle = color;
    ctx.lineWidth = 1;
    ctx.beginPath();
    ctx.moveTo(x(i), y(b.high));
    ctx.lineTo(x(i), y(b.low));
    ctx.stroke();
    const top = y(Math.max(b.open, b.close));
    const body = Math.max(1, y(Math.min(b.open, b.close)) - top);
    ctx.fillRect(x(i) - step * 0.35, top, step * 0.7, body);
  });

  const line = (key, color) => {
    ctx.strokeStyle = color; ctx.lineWidth = 2; ctx.beginPath();
    bars.forEach((b, i) => (i ? ctx.lineTo : ctx.moveTo).call(ctx, x(i), y(b[key])));
    ctx.stroke();
  };
  line("ema_short", "#4c8bf5");
  line("ema_long", "#ff9800");

  for (const c of data.crossovers) {
    const i = index.get(c.timestamp);
    if (i === undefined) continue;
    ctx.fillStyle = c.direction === "bullish" ? "#26a69a" : "#ef5350";
    ctx.beginPath();
    ctx.arc(x(i), y(c.close), 6, 0, 2 * Math.PI);
    ctx.fill();
  }

  // Last price tagged with the current trend and strength.
  const last = bars[bars.length - 1];
  const t = data.analysis;
  ctx.fillStyle = t.trend === "BULLISH" ? "#26a69a" : t.trend === "BEARISH" ? "#ef5350" : "#9e9e9e";
  ctx.fillText(`$${fmt(last.close)}`, x(bars.length - 1) + 10, y(last.close) - 6);
  ctx.fillText(`${t.trend} (${t.strength.toFixed(1)})`, x(bars.length - 1) + 10, y(last.close) + 10);

  ctx.fillStyle = "#8a8f98";
  ctx.fillText(`${data.name} (${data.timeframe})  high ${fmt(max)}  low ${fmt(min)}`, pad, 20);
}

async function loadChart() {
  if (!selected) return;
  const tf = $("timeframe").value;
  try {
    const data = await getJson(`/api/trends/${selected}?timeframe=${tf}`);
    drawChart(data);
    const t = data.analysis;
    $("details").textContent = `Price ${t.price_above_ema_short ? "above" : "below"} EMA-short, ` +
      `${t.price_above_ema_long ? "above" : "below"} EMA-long.`;
  } catch (e) {
    $("chart").getContext("2d").clearRect(0, 0, $("chart").width, $("chart").height);
    $("details").textContent = e.message;
  }
}

async function loadHeatmap() {
  const data = await getJson("/api/heatmap");
  const head = "<tr><th></th>" + data.timeframes.map((t) => `<th>${t}</th>`).join("") + "</tr>";
  const rows = data.rows.map((r) => "<tr><th>" + esc(r.name) + "</th>" + r.values.map((v) => {
    if (v === null) return `<td class="muted">No Data</td>`;
    const color = v > 0 ? `rgba(38,166,154,${v})` : v < 0 ? `rgba(239,83,80,${-v})` : "transparent";
    return `<td style="background:${color}">${v.toFixed(1)}</td>`;
  }).join("") + "</tr>").join("");
  $("heatmap").innerHTML = head + rows;
}

async function reload() {
  await Promise.allSettled([loadSummary(), loadChart(), loadHeatmap()]);
  $("updated").textContent = "Last updated " + new Date().toLocaleTimeString();
}

$("timeframe").onchange = reload;
$("refresh").onclick = async () => { await fetch("/api/refresh", { method: "POST" }); reload(); };
$("auto").onchange = (e) => {
  clearInterval(timer);
  if (e.target.checked) timer = setInterval(reload, AUTO_REFRESH_MS);
};

loadTimeframes().then(reload);
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Timeframe;

    #[test]
    fn render_injects_defaults() {
        let settings = DashboardSettings {
            assets: vec![],
            default_timeframe: Timeframe::TwelveHours,
            cache_ttl_secs: 300,
            auto_refresh_secs: 15,
        };
        let html = render(&settings);
        assert!(html.contains(r#"const DEFAULT_TIMEFRAME = "12H";"#));
        assert!(html.contains("const AUTO_REFRESH_MS = 15000;"));
        assert!(!html.contains("__"));
    }

    #[test]
    fn server_strings_are_escaped_before_markup() {
        let html = render(&DashboardSettings {
            assets: vec![],
            default_timeframe: Timeframe::OneDay,
            cache_ttl_secs: 300,
            auto_refresh_secs: 30,
        });
        assert!(html.contains("const esc = (s)"));
        for raw in ["${a.name}", "${a.message}", "\"<tr><th>\" + r.name"] {
            assert!(!html.contains(raw), "unescaped interpolation: {raw}");
        }
        assert!(html.contains("${esc(a.message)}"));
        assert!(html.contains("esc(r.name)"));
    }

    #[test]
    fn heatmap_cells_without_data_are_labelled() {
        let html = render(&DashboardSettings {
            assets: vec![],
            default_timeframe: Timeframe::OneDay,
            cache_ttl_secs: 300,
            auto_refresh_secs: 30,
        });
        assert!(html.contains("if (v === null)"));
        assert!(html.contains("No Data"));
    }

    #[test]
    fn chart_draws_candles_and_tags_the_last_price() {
        let html = render(&DashboardSettings {
            assets: vec![],
            default_timeframe: Timeframe::OneDay,
            cache_ttl_secs: 300,
            auto_refresh_secs: 30,
        });
        assert!(html.contains("y(b.high)") && html.contains("y(b.low)"));
        assert!(html.contains("fillRect"));
        assert!(html.contains("t.strength.toFixed(1)"));
    }
}
